pub mod ndt;
