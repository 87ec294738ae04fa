pub mod index_refresh;
