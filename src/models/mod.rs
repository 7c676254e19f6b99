mod contact;
mod media;
mod portfolio;
mod product;
mod settings;

pub use contact::*;
pub use media::*;
pub use portfolio::*;
pub use product::*;
pub use settings::*;
