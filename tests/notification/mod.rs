mod access_order;
mod failure_propagation;
