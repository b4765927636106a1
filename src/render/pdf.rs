use lopdf::{
    content::{Content, Operation},
    dictionary, Document, Object, Stream, StringFormat,
};

use super::layout::{Align, Element, Page, Rgb, Weight, PAGE_HEIGHT, PAGE_WIDTH};

/// Points per millimetre
const PT: f32 = 72.0 / 25.4;

const REGULAR: &str = "F1";
const BOLD: &str = "F2";

/// Writes laid out pages as a PDF using the standard Helvetica faces
pub fn write_pdf(pages: &[Page]) -> Result<Vec<u8>, lopdf::Error> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR => regular_id,
            BOLD => bold_id,
        },
    });

    let mut kids = Vec::with_capacity(pages.len());
    for page in pages {
        let content = Content { operations: operations(page) };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::from(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(pages_id, Object::Dictionary(dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(PAGE_WIDTH * PT),
            Object::Real(PAGE_HEIGHT * PT),
        ],
    }));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;

    Ok(bytes)
}

fn operations(page: &Page) -> Vec<Operation> {
    let mut ops = Vec::new();

    for element in &page.elements {
        match element {
            Element::Fill { x, y, width, height, color } => {
                ops.push(fill_color(*color));
                // PDF rectangles grow upwards from their lower left corner
                ops.push(Operation::new("re", vec![
                    Object::Real(x * PT),
                    Object::Real((PAGE_HEIGHT - y - height) * PT),
                    Object::Real(width * PT),
                    Object::Real(height * PT),
                ]));
                ops.push(Operation::new("f", vec![]));
            },
            Element::Text { x, y, size, weight, color, align, content } => {
                let encoded = win_ansi(content);
                let left = match align {
                    Align::Left => *x,
                    Align::Center => x - text_width(encoded.len(), *size, *weight) / 2.0,
                };
                let font = match weight {
                    Weight::Normal => REGULAR,
                    Weight::Bold => BOLD,
                };

                ops.push(fill_color(*color));
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new("Tf", vec![font.into(), Object::Real(*size)]));
                ops.push(Operation::new("Td", vec![Object::Real(left * PT), Object::Real((PAGE_HEIGHT - y) * PT)]));
                ops.push(Operation::new("Tj", vec![Object::String(encoded, StringFormat::Literal)]));
                ops.push(Operation::new("ET", vec![]));
            },
        }
    }

    ops
}

fn fill_color(Rgb(r, g, b): Rgb) -> Operation {
    Operation::new("rg", vec![
        Object::Real(r as f32 / 255.0),
        Object::Real(g as f32 / 255.0),
        Object::Real(b as f32 / 255.0),
    ])
}

/// Rough Helvetica advance width in millimetres, only used for centering
fn text_width(chars: usize, size: f32, weight: Weight) -> f32 {
    let em = match weight {
        Weight::Normal => 0.52,
        Weight::Bold => 0.58,
    };

    chars as f32 * em * size / PT
}

/// WinAnsi glyphs placed where Latin-1 has its C1 control codes
const WIN_ANSI_HIGH: [(char, u8); 27] = [
    ('€', 0x80), ('‚', 0x82), ('ƒ', 0x83), ('„', 0x84), ('…', 0x85), ('†', 0x86), ('‡', 0x87),
    ('ˆ', 0x88), ('‰', 0x89), ('Š', 0x8A), ('‹', 0x8B), ('Œ', 0x8C), ('Ž', 0x8E), ('‘', 0x91),
    ('’', 0x92), ('“', 0x93), ('”', 0x94), ('•', 0x95), ('–', 0x96), ('—', 0x97), ('˜', 0x98),
    ('™', 0x99), ('š', 0x9A), ('›', 0x9B), ('œ', 0x9C), ('ž', 0x9E), ('Ÿ', 0x9F),
];

/// Encodes text for the WinAnsi standard fonts.
///
/// The rupee sign has no glyph there and is spelled out, anything else
/// WinAnsi cannot show becomes `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len());

    for c in text.chars() {
        if c == '₹' {
            bytes.extend_from_slice(b"Rs.");
        } else if let Some(&(_, byte)) = WIN_ANSI_HIGH.iter().find(|(glyph, _)| *glyph == c) {
            bytes.push(byte);
        } else if matches!(c as u32, 0x20..=0x7E | 0xA0..=0xFF) {
            bytes.push(c as u8);
        } else {
            bytes.push(b'?');
        }
    }

    bytes
}
