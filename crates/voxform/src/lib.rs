#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use voxform_linalg as linalg;

#[doc(inline)]
pub use voxform_image as image;

#[doc(inline)]
pub use voxform_interp as interp;

#[doc(inline)]
pub use voxform_io as io;

#[doc(inline)]
pub use voxform_transform as transform;
