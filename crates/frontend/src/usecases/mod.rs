pub mod u601_chip_export;
