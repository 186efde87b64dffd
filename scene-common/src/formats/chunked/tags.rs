//! One-byte tags for enums stored in chunk payloads

use scenepack_shared::{
    AccessorType, AlphaMode, AnimationPath, BufferTarget, Interpolation, LightKind, MaterialKind,
    PrimitiveMode,
};

use crate::bytes::{ByteReader, ByteWriter};
use crate::error::{FormatError, Result};

pub trait ByteTag: Sized + Copy {
    /// Name used in `InvalidTag` errors
    const WHAT: &'static str;

    fn tag(self) -> u8;
    fn from_tag(tag: u8) -> Option<Self>;
}

macro_rules! impl_byte_tag {
    ($ty:ty, $what:literal, { $($variant:ident = $tag:literal),+ $(,)? }) => {
        impl ByteTag for $ty {
            const WHAT: &'static str = $what;

            fn tag(self) -> u8 {
                match self {
                    $(Self::$variant => $tag,)+
                }
            }

            fn from_tag(tag: u8) -> Option<Self> {
                match tag {
                    $($tag => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

impl_byte_tag!(MaterialKind, "material kind", { Pbr = 0, Unlit = 1, Custom = 2 });
impl_byte_tag!(AlphaMode, "alpha mode", { Opaque = 0, Mask = 1, Blend = 2 });
impl_byte_tag!(AccessorType, "accessor type", {
    Scalar = 0, Vec2 = 1, Vec3 = 2, Vec4 = 3, Mat2 = 4, Mat3 = 5, Mat4 = 6,
});
impl_byte_tag!(PrimitiveMode, "primitive mode", {
    Points = 0, Lines = 1, LineLoop = 2, LineStrip = 3,
    Triangles = 4, TriangleStrip = 5, TriangleFan = 6,
});
impl_byte_tag!(AnimationPath, "animation path", {
    Translation = 0, Rotation = 1, Scale = 2, Weights = 3,
});
impl_byte_tag!(Interpolation, "interpolation", { Linear = 0, Step = 1, CubicSpline = 2 });
impl_byte_tag!(LightKind, "light kind", { Directional = 0, Point = 1, Spot = 2 });
impl_byte_tag!(BufferTarget, "buffer target", { ArrayBuffer = 1, ElementArrayBuffer = 2 });

pub fn write_tag<T: ByteTag>(w: &mut ByteWriter, value: T) {
    w.write_u8(value.tag());
}

pub fn read_tag<T: ByteTag>(r: &mut ByteReader<'_>) -> Result<T> {
    let value = r.read_u8()?;
    T::from_tag(value).ok_or(FormatError::InvalidTag {
        what: T::WHAT,
        value: value as u32,
    })
}

/// `0` encodes `None`; tags must therefore be non-zero
pub fn write_opt_tag<T: ByteTag>(w: &mut ByteWriter, value: Option<T>) {
    w.write_u8(value.map(ByteTag::tag).unwrap_or(0));
}

pub fn read_opt_tag<T: ByteTag>(r: &mut ByteReader<'_>) -> Result<Option<T>> {
    match r.read_u8()? {
        0 => Ok(None),
        value => T::from_tag(value)
            .map(Some)
            .ok_or(FormatError::InvalidTag {
                what: T::WHAT,
                value: value as u32,
            }),
    }
}
