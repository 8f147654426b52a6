pub mod config;
pub mod cytoband;
pub mod descriptor;
pub mod domain;
pub mod error;
pub mod fai;
pub mod fs_util;
pub mod output;
pub mod packager;
pub mod workdir;
