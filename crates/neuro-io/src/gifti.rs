//! GIFTI surface data files (`.func.gii`, `.label.gii`).
//!
//! Only what the projection writes is supported: one-dimensional data
//! arrays, one per volume, stored with ASCII encoding. Functional files
//! carry `NIFTI_INTENT_ESTIMATE` float32 arrays; label files carry
//! `NIFTI_INTENT_LABEL` int32 arrays plus a label table listing every key
//! that occurs.

use ndarray::Array2;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::Path;
use tracing::debug;

use crate::error::{IoError, IoResult};

const GIFTI_DOCTYPE: &str = r#"GIFTI SYSTEM "http://www.nitrc.org/frs/download.php/115/gifti.dtd""#;

/// Semantic intent of a data array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GiftiIntent {
    Estimate,
    Label,
}

impl GiftiIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            GiftiIntent::Estimate => "NIFTI_INTENT_ESTIMATE",
            GiftiIntent::Label => "NIFTI_INTENT_LABEL",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "NIFTI_INTENT_ESTIMATE" => Some(GiftiIntent::Estimate),
            "NIFTI_INTENT_LABEL" => Some(GiftiIntent::Label),
            _ => None,
        }
    }
}

/// Values of a data array.
#[derive(Debug, Clone, PartialEq)]
pub enum GiftiData {
    Float32(Vec<f32>),
    Int32(Vec<i32>),
}

impl GiftiData {
    pub fn data_type(&self) -> &'static str {
        match self {
            GiftiData::Float32(_) => "NIFTI_TYPE_FLOAT32",
            GiftiData::Int32(_) => "NIFTI_TYPE_INT32",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            GiftiData::Float32(v) => v.len(),
            GiftiData::Int32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values widened to f64.
    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            GiftiData::Float32(v) => v.iter().map(|&x| x as f64).collect(),
            GiftiData::Int32(v) => v.iter().map(|&x| x as f64).collect(),
        }
    }

    fn ascii(&self) -> String {
        let mut out = String::new();
        match self {
            GiftiData::Float32(v) => {
                for x in v {
                    let _ = write!(out, "{} ", x);
                }
            }
            GiftiData::Int32(v) => {
                for x in v {
                    let _ = write!(out, "{} ", x);
                }
            }
        }
        out.pop();
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GiftiDataArray {
    pub intent: GiftiIntent,
    pub data: GiftiData,
}

/// An in-memory GIFTI document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GiftiImage {
    pub arrays: Vec<GiftiDataArray>,
    /// Label keys, ascending. Empty for functional files.
    pub labels: Vec<i32>,
}

impl GiftiImage {
    /// Functional image from `(volumes × vertices)` data, narrowed to f32.
    pub fn func(data: &Array2<f64>) -> Self {
        let arrays = data
            .rows()
            .into_iter()
            .map(|row| GiftiDataArray {
                intent: GiftiIntent::Estimate,
                data: GiftiData::Float32(row.iter().map(|&v| v as f32).collect()),
            })
            .collect();
        Self {
            arrays,
            labels: Vec::new(),
        }
    }

    /// Label image from `(volumes × vertices)` data.
    ///
    /// Values are truncated toward zero; out of range values saturate and
    /// NaN becomes 0.
    pub fn label(data: &Array2<f64>) -> Self {
        let mut keys = BTreeSet::new();
        let arrays = data
            .rows()
            .into_iter()
            .map(|row| {
                let values: Vec<i32> = row.iter().map(|&v| v as i32).collect();
                keys.extend(values.iter().copied());
                GiftiDataArray {
                    intent: GiftiIntent::Label,
                    data: GiftiData::Int32(values),
                }
            })
            .collect();
        Self {
            arrays,
            labels: keys.into_iter().collect(),
        }
    }

    pub fn num_arrays(&self) -> usize {
        self.arrays.len()
    }

    /// Serialize as GIFTI XML.
    pub fn to_xml(&self) -> Result<String, quick_xml::Error> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::DocType(BytesText::from_escaped(GIFTI_DOCTYPE)))?;

        let num_arrays = self.arrays.len().to_string();
        let mut root = BytesStart::new("GIFTI");
        root.push_attribute(("Version", "1.0"));
        root.push_attribute(("NumberOfDataArrays", num_arrays.as_str()));
        writer.write_event(Event::Start(root))?;

        writer.write_event(Event::Empty(BytesStart::new("MetaData")))?;

        if self.labels.is_empty() {
            writer.write_event(Event::Empty(BytesStart::new("LabelTable")))?;
        } else {
            writer.write_event(Event::Start(BytesStart::new("LabelTable")))?;
            for key in &self.labels {
                let key = key.to_string();
                let mut label = BytesStart::new("Label");
                label.push_attribute(("Key", key.as_str()));
                writer.write_event(Event::Start(label))?;
                writer.write_event(Event::Text(BytesText::new(&key)))?;
                writer.write_event(Event::End(BytesEnd::new("Label")))?;
            }
            writer.write_event(Event::End(BytesEnd::new("LabelTable")))?;
        }

        for array in &self.arrays {
            let dim0 = array.data.len().to_string();
            let mut elem = BytesStart::new("DataArray");
            elem.push_attribute(("Intent", array.intent.as_str()));
            elem.push_attribute(("DataType", array.data.data_type()));
            elem.push_attribute(("ArrayIndexingOrder", "RowMajorOrder"));
            elem.push_attribute(("Dimensionality", "1"));
            elem.push_attribute(("Dim0", dim0.as_str()));
            elem.push_attribute(("Encoding", "ASCII"));
            elem.push_attribute(("Endian", "LittleEndian"));
            elem.push_attribute(("ExternalFileName", ""));
            elem.push_attribute(("ExternalFileOffset", ""));
            writer.write_event(Event::Start(elem))?;

            writer.write_event(Event::Empty(BytesStart::new("MetaData")))?;
            writer.write_event(Event::Start(BytesStart::new("Data")))?;
            writer.write_event(Event::Text(BytesText::new(&array.data.ascii())))?;
            writer.write_event(Event::End(BytesEnd::new("Data")))?;

            writer.write_event(Event::End(BytesEnd::new("DataArray")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("GIFTI")))?;

        Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
    }
}

/// Write a GIFTI file.
pub fn write_gifti(path: &Path, image: &GiftiImage) -> IoResult<()> {
    let xml = image.to_xml().map_err(|e| IoError::gifti(path, e))?;
    std::fs::write(path, xml).map_err(|e| IoError::io(path, e))?;
    debug!(path = %path.display(), arrays = image.num_arrays(), "Wrote GIFTI");
    Ok(())
}

/// Read a GIFTI file written with ASCII encoding.
pub fn read_gifti(path: &Path) -> IoResult<GiftiImage> {
    let text = std::fs::read_to_string(path).map_err(|e| IoError::io(path, e))?;
    parse_gifti(&text, path)
}

/// Attributes of the data array currently being parsed.
struct PendingArray {
    intent: GiftiIntent,
    data_type: String,
    dim0: usize,
    text: String,
}

/// Parse GIFTI XML. `path` is only used in error messages.
pub fn parse_gifti(xml: &str, path: &Path) -> IoResult<GiftiImage> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut image = GiftiImage::default();
    let mut pending: Option<PendingArray> = None;
    let mut in_data = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"DataArray" => {
                    let mut intent = None;
                    let mut data_type = String::new();
                    let mut dim0 = None;
                    for attr in e.attributes() {
                        let attr = attr.map_err(|e| IoError::gifti(path, e))?;
                        let value = attr
                            .unescape_value()
                            .map_err(|e| IoError::gifti(path, e))?;
                        match attr.key.as_ref() {
                            b"Intent" => intent = GiftiIntent::parse(&value),
                            b"DataType" => data_type = value.into_owned(),
                            b"Dim0" => dim0 = value.parse::<usize>().ok(),
                            b"Encoding" if value != "ASCII" => {
                                return Err(IoError::gifti(
                                    path,
                                    format!("unsupported encoding '{}'", value),
                                ));
                            }
                            _ => {}
                        }
                    }
                    pending = Some(PendingArray {
                        intent: intent
                            .ok_or_else(|| IoError::gifti(path, "missing or unknown Intent"))?,
                        data_type,
                        dim0: dim0.ok_or_else(|| IoError::gifti(path, "missing Dim0"))?,
                        text: String::new(),
                    });
                }
                b"Data" => in_data = true,
                b"Label" => {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"Key" {
                            let key = String::from_utf8_lossy(&attr.value);
                            let key = key
                                .trim()
                                .parse::<i32>()
                                .map_err(|_| IoError::gifti(path, format!("bad label key '{}'", key)))?;
                            image.labels.push(key);
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Text(t)) if in_data => {
                if let Some(array) = pending.as_mut() {
                    array
                        .text
                        .push_str(&t.unescape().map_err(|e| IoError::gifti(path, e))?);
                    array.text.push(' ');
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"Data" => in_data = false,
                b"DataArray" => {
                    if let Some(array) = pending.take() {
                        image.arrays.push(finish_array(array, path)?);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(IoError::gifti(
                    path,
                    format!("XML error at position {}: {}", reader.buffer_position(), e),
                ))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(image)
}

fn finish_array(array: PendingArray, path: &Path) -> IoResult<GiftiDataArray> {
    let tokens = array.text.split_whitespace();
    let data = match array.data_type.as_str() {
        "NIFTI_TYPE_FLOAT32" => GiftiData::Float32(
            tokens
                .map(|t| t.parse::<f32>())
                .collect::<Result<_, _>>()
                .map_err(|e| IoError::gifti(path, e))?,
        ),
        "NIFTI_TYPE_INT32" => GiftiData::Int32(
            tokens
                .map(|t| t.parse::<i32>())
                .collect::<Result<_, _>>()
                .map_err(|e| IoError::gifti(path, e))?,
        ),
        other => {
            return Err(IoError::gifti(
                path,
                format!("unsupported DataType '{}'", other),
            ))
        }
    };

    if data.len() != array.dim0 {
        return Err(IoError::gifti(
            path,
            format!("Dim0 is {} but {} values were found", array.dim0, data.len()),
        ));
    }

    Ok(GiftiDataArray {
        intent: array.intent,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::path::PathBuf;

    #[test]
    fn test_func_arrays_one_per_volume() {
        let data = array![[1.5, 2.0, -3.25], [0.0, 0.5, 1.0]];
        let image = GiftiImage::func(&data);
        assert_eq!(image.num_arrays(), 2);
        assert!(image.labels.is_empty());
        assert_eq!(image.arrays[0].intent, GiftiIntent::Estimate);
        assert_eq!(image.arrays[0].data, GiftiData::Float32(vec![1.5, 2.0, -3.25]));
    }

    #[test]
    fn test_label_truncates_and_saturates() {
        let data = array![[2.9, -1.7, f64::NAN, 1e12]];
        let image = GiftiImage::label(&data);
        assert_eq!(image.arrays[0].intent, GiftiIntent::Label);
        assert_eq!(
            image.arrays[0].data,
            GiftiData::Int32(vec![2, -1, 0, i32::MAX])
        );
        assert_eq!(image.labels, vec![-1, 0, 2, i32::MAX]);
    }

    #[test]
    fn test_xml_header_attributes() {
        let image = GiftiImage::func(&array![[1.0, 2.0]]);
        let xml = image.to_xml().unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<!DOCTYPE GIFTI SYSTEM"));
        assert!(xml.contains("NumberOfDataArrays=\"1\""));
        assert!(xml.contains("Intent=\"NIFTI_INTENT_ESTIMATE\""));
        assert!(xml.contains("DataType=\"NIFTI_TYPE_FLOAT32\""));
        assert!(xml.contains("Dim0=\"2\""));
        assert!(xml.contains("Encoding=\"ASCII\""));
    }

    #[test]
    fn test_parse_label_document() {
        let image = GiftiImage::label(&array![[3.0, 1.0, 3.0], [2.0, 2.0, 2.0]]);
        let xml = image.to_xml().unwrap();
        let parsed = parse_gifti(&xml, &PathBuf::from("lh.test.label.gii")).unwrap();
        assert_eq!(parsed, image);
    }

    #[test]
    fn test_dim0_mismatch_rejected() {
        let xml = r#"<GIFTI Version="1.0" NumberOfDataArrays="1">
            <DataArray Intent="NIFTI_INTENT_ESTIMATE" DataType="NIFTI_TYPE_FLOAT32" Dim0="3" Encoding="ASCII">
              <Data>1 2</Data>
            </DataArray>
          </GIFTI>"#;
        let err = parse_gifti(xml, &PathBuf::from("x.func.gii")).unwrap_err();
        assert!(err.to_string().contains("Dim0 is 3"));
    }

    #[test]
    fn test_binary_encoding_rejected() {
        let xml = r#"<GIFTI><DataArray Intent="NIFTI_INTENT_ESTIMATE" DataType="NIFTI_TYPE_FLOAT32" Dim0="1" Encoding="GZipBase64Binary"><Data>AAAA</Data></DataArray></GIFTI>"#;
        let err = parse_gifti(xml, &PathBuf::from("x.func.gii")).unwrap_err();
        assert!(err.to_string().contains("unsupported encoding"));
    }
}
