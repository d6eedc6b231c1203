//! Deep Zoom descriptor (`.dzi`) in its XML and JSON encodings.

use std::fs;
use std::path::Path;

use imaginarium::EncodeFormat;
use serde_json::{Value, json};

use crate::config::DescriptorFormat;
use crate::error::{Error, Result};
use crate::pyramid::PyramidLayout;

pub const DEEPZOOM_XMLNS: &str = "http://schemas.microsoft.com/deepzoom/2008";

/// Everything a viewer needs to address the tiles of a pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PyramidDescriptor {
    pub tile_size: u32,
    pub overlap: u32,
    pub format: EncodeFormat,
    pub width: u32,
    pub height: u32,
}

impl PyramidDescriptor {
    pub fn new(layout: &PyramidLayout, format: EncodeFormat) -> Self {
        Self {
            tile_size: layout.tile_size(),
            overlap: layout.overlap(),
            format,
            width: layout.width(),
            height: layout.height(),
        }
    }

    pub fn to_xml(&self) -> String {
        format!(
            concat!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
                "<Image xmlns=\"{}\" TileSize=\"{}\" Overlap=\"{}\" Format=\"{}\">\n",
                "  <Size Width=\"{}\" Height=\"{}\"/>\n",
                "</Image>\n"
            ),
            DEEPZOOM_XMLNS,
            self.tile_size,
            self.overlap,
            self.format.extension(),
            self.width,
            self.height
        )
    }

    pub fn to_json(&self) -> String {
        let doc = json!({
            "Image": {
                "xmlns": DEEPZOOM_XMLNS,
                "Format": self.format.extension(),
                "Overlap": self.overlap.to_string(),
                "TileSize": self.tile_size.to_string(),
                "Size": {
                    "Width": self.width.to_string(),
                    "Height": self.height.to_string(),
                }
            }
        });

        let mut text = serde_json::to_string_pretty(&doc).unwrap_or_default();
        text.push('\n');
        text
    }

    pub fn render(&self, format: DescriptorFormat) -> String {
        match format {
            DescriptorFormat::Xml => self.to_xml(),
            DescriptorFormat::Json => self.to_json(),
        }
    }

    /// Writes the descriptor so that readers see either nothing or the whole file.
    pub fn write(&self, path: &Path, format: DescriptorFormat) -> Result<()> {
        let file_name = path
            .file_name()
            .ok_or_else(|| Error::config(format!("descriptor path {} has no file name", path.display())))?;
        let mut temp_name = file_name.to_os_string();
        temp_name.push(".tmp");
        let temp_path = path.with_file_name(temp_name);

        fs::write(&temp_path, self.render(format)).map_err(|e| Error::io(&temp_path, e))?;
        fs::rename(&temp_path, path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            Error::io(path, e)
        })?;

        Ok(())
    }

    /// Reads a descriptor written in either encoding.
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(&text).map_err(|reason| Error::Descriptor {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Parses XML or JSON, telling them apart by the first character.
    pub fn parse(text: &str) -> std::result::Result<Self, String> {
        if text.trim_start().starts_with('{') {
            parse_json(text)
        } else {
            parse_xml(text)
        }
    }
}

fn parse_format(value: &str) -> std::result::Result<EncodeFormat, String> {
    EncodeFormat::from_extension(value).map_err(|_| format!("unsupported tile format '{}'", value))
}

fn parse_number(name: &str, value: &str) -> std::result::Result<u32, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("{} is not a non-negative integer: '{}'", name, value))
}

/// Value of attribute `name` on the first element `element`.
fn xml_attr<'a>(text: &'a str, element: &str, name: &str) -> Option<&'a str> {
    let open = format!("<{}", element);
    let start = text.find(&open)? + open.len();
    let tag = &text[start..start + text[start..].find('>')?];

    let needle = format!("{}=\"", name);
    let mut search = tag;
    loop {
        let pos = search.find(&needle)?;
        let preceded_by_space = search[..pos]
            .chars()
            .next_back()
            .is_some_and(char::is_whitespace);
        let rest = &search[pos + needle.len()..];
        if preceded_by_space {
            return rest.find('"').map(|end| &rest[..end]);
        }
        search = rest;
    }
}

fn parse_xml(text: &str) -> std::result::Result<PyramidDescriptor, String> {
    let attr = |element: &str, name: &str| {
        xml_attr(text, element, name).ok_or_else(|| format!("missing {} attribute {}", element, name))
    };

    let xmlns = attr("Image", "xmlns")?;
    if xmlns != DEEPZOOM_XMLNS {
        return Err(format!("unexpected namespace '{}'", xmlns));
    }

    Ok(PyramidDescriptor {
        tile_size: parse_number("TileSize", attr("Image", "TileSize")?)?,
        overlap: parse_number("Overlap", attr("Image", "Overlap")?)?,
        format: parse_format(attr("Image", "Format")?)?,
        width: parse_number("Width", attr("Size", "Width")?)?,
        height: parse_number("Height", attr("Size", "Height")?)?,
    })
}

fn parse_json(text: &str) -> std::result::Result<PyramidDescriptor, String> {
    let doc: Value = serde_json::from_str(text).map_err(|e| e.to_string())?;
    let image = doc.get("Image").ok_or("missing Image object")?;
    let size = image.get("Size").ok_or("missing Size object")?;

    // Viewers accept numbers written either as strings or as JSON numbers
    let number = |obj: &Value, name: &str| match obj.get(name) {
        Some(Value::String(s)) => parse_number(name, s),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| format!("{} is out of range: {}", name, n)),
        _ => Err(format!("missing {}", name)),
    };

    let format = image
        .get("Format")
        .and_then(Value::as_str)
        .ok_or("missing Format")?;

    Ok(PyramidDescriptor {
        tile_size: number(image, "TileSize")?,
        overlap: number(image, "Overlap")?,
        format: parse_format(format)?,
        width: number(size, "Width")?,
        height: number(size, "Height")?,
    })
}
