mod args;
mod scheduler;
