pub mod a001_filter_set;
