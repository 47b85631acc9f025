//! Geometry emitter: turns a computed layout into the response document

use serde::Serialize;

use crate::layout::{checked_pixels, ComputedLayout, LayoutError, Rect, CONTAINER_ID};

/// Class name reported for the root frame
pub const CONTENT_FRAME_NAME: &str = "android.support.v7.widget.ContentFrameLayout";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentFrame {
    pub name: String,
    pub location: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    pub id: String,
    pub location: Rect,
}

/// Resolved layout as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutTree {
    pub content_frame: ContentFrame,
    pub components: Vec<Component>,
    pub warnings: Vec<String>,
}

impl LayoutTree {
    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }
}

fn shifted(id: &str, rect: Rect, x_offset: i32, y_offset: i32) -> Result<Rect, LayoutError> {
    rect.translate(x_offset, y_offset).ok_or_else(|| {
        let x = i64::from(rect.x) + i64::from(x_offset);
        let y = i64::from(rect.y) + i64::from(y_offset);
        let value = if checked_pixels(x).is_none() { x } else { y };
        LayoutError::out_of_range(format!("offset location of '{id}'"), value)
    })
}

/// Build the response, shifting every rectangle by the request offset.
///
/// `extra_warnings` (typically from request parsing) come first.
pub fn emit(
    layout: ComputedLayout,
    x_offset: i32,
    y_offset: i32,
    extra_warnings: Vec<String>,
) -> Result<LayoutTree, LayoutError> {
    let mut warnings = extra_warnings;
    warnings.extend(layout.warnings);

    let components = layout
        .elements
        .into_iter()
        .map(|element| {
            Ok(Component {
                location: shifted(&element.id, element.bounds, x_offset, y_offset)?,
                id: element.id,
            })
        })
        .collect::<Result<Vec<_>, LayoutError>>()?;

    Ok(LayoutTree {
        content_frame: ContentFrame {
            name: CONTENT_FRAME_NAME.to_string(),
            location: shifted(CONTAINER_ID, layout.frame, x_offset, y_offset)?,
        },
        components,
        warnings,
    })
}
