//! Built-in GLSL ES sources.
//!
//! Fragment templates carry two placeholders that [`Program::compile`]
//! substitutes per texture format:
//! - `@builtin_ext@`: extension declarations; must directly follow `#version`
//! - `@builtin@`: the `get_pixel(vec2)` sampling function
//!
//! Templates must not define `_kiln_texture`, `_kiln_y_base`, `_kiln_y_mult`
//! or `get_pixel`.
//!
//! [`Program::compile`]: super::Program::compile

use super::TextureFormat;

pub const BUILTIN: &str = "@builtin@";
pub const BUILTIN_EXT: &str = "@builtin_ext@";

pub const Y_BASE_UNIFORM: &str = "_kiln_y_base";
pub const Y_MULT_UNIFORM: &str = "_kiln_y_mult";

/// Vertex shader shared by the built-in programs: `position`, `uvPosition`, `MVP`.
pub const DEFAULT_VERTEX: &str = include_str!("default.vert");

/// Textured-quad fragment template: `get_pixel(uv) * color`.
pub const TEXTURED_FRAGMENT: &str = include_str!("textured.frag");

/// Solid-color fragment shader (RGBA class only).
pub const SOLID_FRAGMENT: &str = include_str!("solid.frag");

const BUILTIN_RGBA: &str = include_str!("builtin_rgba.glsl");
const BUILTIN_RGBX: &str = include_str!("builtin_rgbx.glsl");
const BUILTIN_EXTERNAL: &str = include_str!("builtin_external.glsl");
const BUILTIN_EXT_EXTERNAL: &str = "#extension GL_OES_EGL_image_external : require\n";

/// `(builtin, builtin_ext)` substitutions for `format`.
pub fn builtins(format: TextureFormat) -> (&'static str, &'static str) {
    match format {
        TextureFormat::Rgba => (BUILTIN_RGBA, ""),
        TextureFormat::Rgbx => (BUILTIN_RGBX, ""),
        TextureFormat::External => (BUILTIN_EXTERNAL, BUILTIN_EXT_EXTERNAL),
    }
}

/// Replaces the first occurrence of `placeholder`; sources without it are
/// returned unchanged.
pub fn replace_builtin(source: &str, placeholder: &str, with: &str) -> String {
    source.replacen(placeholder, with, 1)
}

/// Specializes a fragment template for `format`.
pub fn specialize(fragment: &str, format: TextureFormat) -> String {
    let (builtin, builtin_ext) = builtins(format);
    let fragment = replace_builtin(fragment, BUILTIN, builtin);
    replace_builtin(&fragment, BUILTIN_EXT, builtin_ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specialize_fills_both_placeholders() {
        for format in TextureFormat::ALL {
            let src = specialize(TEXTURED_FRAGMENT, format);
            assert!(!src.contains(BUILTIN), "{format:?}");
            assert!(!src.contains(BUILTIN_EXT), "{format:?}");
            assert!(src.contains("get_pixel(highp vec2 pos)"), "{format:?}");
        }
    }

    #[test]
    fn external_extension_follows_version_line() {
        let src = specialize(TEXTURED_FRAGMENT, TextureFormat::External);
        let mut lines = src.lines();
        assert_eq!(lines.next(), Some("#version 100"));
        assert_eq!(lines.next(), Some("#extension GL_OES_EGL_image_external : require"));
        assert!(src.contains("samplerExternalOES"));
    }

    #[test]
    fn rgbx_forces_opaque_alpha() {
        let src = specialize(TEXTURED_FRAGMENT, TextureFormat::Rgbx);
        assert!(src.contains(".rgb, 1.0"));
        assert!(!specialize(TEXTURED_FRAGMENT, TextureFormat::Rgba).contains(".rgb, 1.0"));
    }

    #[test]
    fn sources_without_placeholders_are_untouched() {
        assert_eq!(specialize(SOLID_FRAGMENT, TextureFormat::Rgba), SOLID_FRAGMENT);
    }
}
