pub mod label_file;
