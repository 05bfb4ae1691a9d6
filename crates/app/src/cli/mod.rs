pub mod args;
pub mod op;
pub mod ops;

pub use ops::{
    Cat, Drives, Export, FindDrive, History, Init, Ls, Mkdir, Open, Put, Rename, Rm, Stat, Tree,
    Version,
};
