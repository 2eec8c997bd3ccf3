mod common;
mod separation;
