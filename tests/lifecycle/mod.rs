mod leak_check;
mod merge_on_create;
