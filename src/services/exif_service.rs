use crate::models::upload_types::GeoPoint;
use exif::{In, Tag};
use std::io::Cursor;

/// EXIF fields the dashboard cares about. Aerial frames from drones usually
/// carry GPS; scanned or exported imagery usually carries nothing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExifSummary {
    pub orientation: Option<u32>,
    pub location: Option<GeoPoint>,
    pub date_taken: Option<String>,
}

/// Best-effort: images without EXIF (or formats that cannot carry it) yield
/// an empty summary.
pub fn read_summary(bytes: &[u8]) -> ExifSummary {
    let exif = match exif::Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(e) => e,
        Err(_) => return ExifSummary::default(),
    };

    let mut summary = ExifSummary::default();

    if let Some(field) = exif.get_field(Tag::Orientation, In::PRIMARY) {
        summary.orientation = match field.value {
            exif::Value::Short(ref v) => v.first().map(|&x| x as u32),
            exif::Value::Long(ref v) => v.first().copied(),
            _ => None,
        };
    }

    if let Some(field) = exif.get_field(Tag::DateTimeOriginal, In::PRIMARY) {
        summary.date_taken = Some(field.display_value().to_string().trim_matches('"').to_string());
    }

    let latitude = match (
        exif.get_field(Tag::GPSLatitude, In::PRIMARY),
        exif.get_field(Tag::GPSLatitudeRef, In::PRIMARY),
    ) {
        (Some(value), Some(reference)) => {
            parse_gps_coord(&value.value, &reference.display_value().to_string())
        }
        _ => None,
    };
    let longitude = match (
        exif.get_field(Tag::GPSLongitude, In::PRIMARY),
        exif.get_field(Tag::GPSLongitudeRef, In::PRIMARY),
    ) {
        (Some(value), Some(reference)) => {
            parse_gps_coord(&value.value, &reference.display_value().to_string())
        }
        _ => None,
    };

    if let (Some(latitude), Some(longitude)) = (latitude, longitude) {
        summary.location = Some(GeoPoint { latitude, longitude });
    }

    summary
}

fn parse_gps_coord(value: &exif::Value, reference: &str) -> Option<f64> {
    if let exif::Value::Rational(ref rationals) = value {
        if rationals.len() >= 3 {
            let degrees = rationals[0].to_f64();
            let minutes = rationals[1].to_f64();
            let seconds = rationals[2].to_f64();
            let mut coord = degrees + minutes / 60.0 + seconds / 3600.0;
            let ref_clean = reference.trim_matches('"').trim();
            if ref_clean == "S" || ref_clean == "W" {
                coord = -coord;
            }
            return Some(coord);
        }
    }
    None
}

/// Apply EXIF orientation to the image.
pub fn apply_orientation(img: image::DynamicImage, orientation: u32) -> image::DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.fliph().rotate90(),
        6 => img.rotate90(),
        7 => img.fliph().rotate270(),
        8 => img.rotate270(),
        _ => img,
    }
}
