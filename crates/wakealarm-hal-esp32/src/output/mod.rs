pub mod actuators;
