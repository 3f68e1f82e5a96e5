pub mod cart_writer;
pub mod command_reader;
