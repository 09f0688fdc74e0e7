#![allow(dead_code)]

use std::fs;
use std::path::Path;

/// Coordinates for a synthesized record, absolute `(row, col)`.
pub enum Coords {
    None,
    Int(Vec<(i16, i16)>),
    Float(Vec<(f32, f32)>),
}

/// Header fields for a synthesized record, laid out the way ImageJ writes them.
pub struct RawRoi {
    pub version: u16,
    pub kind: u8,
    pub top: i16,
    pub left: i16,
    pub bottom: i16,
    pub right: i16,
    pub floats: [f32; 4],
    pub subtype: u16,
    pub options: u16,
    pub coords: Coords,
    pub name: String,
}

impl Default for RawRoi {
    fn default() -> Self {
        Self {
            version: 227,
            kind: 0,
            top: 0,
            left: 0,
            bottom: 0,
            right: 0,
            floats: [0.0; 4],
            subtype: 0,
            options: 0,
            coords: Coords::None,
            name: String::new(),
        }
    }
}

pub const SUB_PIXEL: u16 = 128;

impl RawRoi {
    pub fn bytes(&self) -> Vec<u8> {
        let payload = self.payload();
        let n = match &self.coords {
            Coords::None => 0u16,
            Coords::Int(points) => points.len() as u16,
            Coords::Float(points) => points.len() as u16,
        };
        let header2_offset = 64 + payload.len() as u32;

        let mut b = Vec::new();
        b.extend_from_slice(b"Iout");
        b.extend_from_slice(&self.version.to_be_bytes());
        b.extend_from_slice(&[self.kind, 0]);
        for v in [self.top, self.left, self.bottom, self.right] {
            b.extend_from_slice(&v.to_be_bytes());
        }
        b.extend_from_slice(&n.to_be_bytes());
        for v in self.floats {
            b.extend_from_slice(&v.to_bits().to_be_bytes());
        }
        b.extend_from_slice(&1u16.to_be_bytes()); // stroke width
        b.extend_from_slice(&0u32.to_be_bytes()); // shape roi size
        b.extend_from_slice(&0xFFFF_FF00u32.to_be_bytes()); // stroke color
        b.extend_from_slice(&0u32.to_be_bytes()); // fill color
        b.extend_from_slice(&self.subtype.to_be_bytes());
        b.extend_from_slice(&self.options.to_be_bytes());
        b.extend_from_slice(&[0, 0]); // arrow style, head size
        b.extend_from_slice(&0u16.to_be_bytes()); // rect arc size
        b.extend_from_slice(&0u32.to_be_bytes()); // position
        b.extend_from_slice(&header2_offset.to_be_bytes());
        assert_eq!(b.len(), 64);

        b.extend_from_slice(&payload);

        // header2 is 64 bytes; the name follows it.
        let name_offset = header2_offset + 64;
        let mut header2 = vec![0u8; 64];
        header2[16..20].copy_from_slice(&name_offset.to_be_bytes());
        header2[20..24].copy_from_slice(&(self.name.chars().count() as u32).to_be_bytes());
        b.extend_from_slice(&header2);
        for c in self.name.chars() {
            b.extend_from_slice(&(c as u16).to_be_bytes());
        }
        b
    }

    fn payload(&self) -> Vec<u8> {
        let mut b = Vec::new();
        match &self.coords {
            Coords::None => {}
            Coords::Int(points) => {
                for (_, col) in points {
                    b.extend_from_slice(&(col - self.left).to_be_bytes());
                }
                for (row, _) in points {
                    b.extend_from_slice(&(row - self.top).to_be_bytes());
                }
            }
            Coords::Float(points) => {
                // Legacy integer block, relative to the box.
                for (_, col) in points {
                    b.extend_from_slice(&((*col as i16) - self.left).to_be_bytes());
                }
                for (row, _) in points {
                    b.extend_from_slice(&((*row as i16) - self.top).to_be_bytes());
                }
                for (_, col) in points {
                    b.extend_from_slice(&col.to_bits().to_be_bytes());
                }
                for (row, _) in points {
                    b.extend_from_slice(&row.to_bits().to_be_bytes());
                }
            }
        }
        b
    }

    pub fn write_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(path, self.bytes()).expect("write roi file");
    }
}

pub fn integer_rectangle() -> RawRoi {
    RawRoi {
        kind: 1,
        top: 5,
        left: 4,
        bottom: 10,
        right: 8,
        ..Default::default()
    }
}

pub fn subpixel_rectangle() -> RawRoi {
    RawRoi {
        floats: [4.0, 5.0, 4.0, 5.0],
        options: SUB_PIXEL,
        ..integer_rectangle()
    }
}

/// 100 vertices on a circle of radius 5 around row 15, col 10.
pub fn circle(kind: u8, sub_pixel: bool) -> RawRoi {
    let points: Vec<(f32, f32)> = (0..100)
        .map(|i| {
            let t = i as f32 / 100.0 * std::f32::consts::TAU;
            (15.0 + 5.0 * t.sin(), 10.0 + 5.0 * t.cos())
        })
        .collect();
    let coords = if sub_pixel {
        Coords::Float(points)
    } else {
        Coords::Int(
            points
                .into_iter()
                .map(|(r, c)| (r.round() as i16, c.round() as i16))
                .collect(),
        )
    };
    RawRoi {
        kind,
        top: 10,
        left: 5,
        bottom: 20,
        right: 15,
        options: if sub_pixel { SUB_PIXEL } else { 0 },
        coords,
        name: "circle".into(),
        ..Default::default()
    }
}

pub fn integer_triangle(kind: u8) -> RawRoi {
    RawRoi {
        kind,
        top: 1,
        left: 2,
        bottom: 6,
        right: 10,
        coords: Coords::Int(vec![(6, 2), (3, 4), (1, 10)]),
        name: "0001-0004".into(),
        ..Default::default()
    }
}

pub fn int_point() -> RawRoi {
    RawRoi {
        kind: 10,
        top: 256,
        left: 128,
        bottom: 257,
        right: 129,
        coords: Coords::Int(vec![(256, 128)]),
        ..Default::default()
    }
}

pub fn float_point() -> RawRoi {
    RawRoi {
        kind: 10,
        top: 567,
        left: 123,
        bottom: 568,
        right: 124,
        options: SUB_PIXEL,
        coords: Coords::Float(vec![(567.8, 123.4)]),
        ..Default::default()
    }
}

pub fn centered_oval_16() -> RawRoi {
    RawRoi {
        kind: 2,
        bottom: 16,
        right: 16,
        ..Default::default()
    }
}

/// Every readable fixture, with the file name it is stored under.
pub fn all_fixtures() -> Vec<(&'static str, RawRoi)> {
    vec![
        ("integer_rectangle.roi", integer_rectangle()),
        ("subpixel_rectangle.roi", subpixel_rectangle()),
        ("freehand_circle.roi", circle(7, true)),
        ("polygon_circle.roi", circle(0, false)),
        ("freehand_integer.roi", integer_triangle(7)),
        ("polygon_integer.roi", integer_triangle(0)),
        ("int_point.roi", int_point()),
        ("float_point.roi", float_point()),
        ("16x16_centered_spanning_oval.roi", centered_oval_16()),
    ]
}
