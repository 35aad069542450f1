use std::{
    collections::HashSet,
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    foundation::{
        color::StrokeColor,
        core::{Point, ViewTransform, WORLD_HEIGHT, WORLD_WIDTH},
        error::{DrawerzError, DrawerzResult},
    },
    history::History,
    model::{
        document::Document,
        ids::{LayerId, StrokeId},
        layer::{AnimationSettings, Layer},
        stroke::{Stroke, Tool},
    },
};

/// Name given to loaded layers that carry no name.
pub const LOADED_LAYER_NAME: &str = "Loaded Layer";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LayerOut<'a> {
    id: &'a LayerId,
    name: &'a str,
    strokes: &'a [Stroke],
    animation_settings: &'a AnimationSettings,
    is_visible: bool,
    opacity: f32,
    /// Derived from the document selection; ignored on load.
    is_active: bool,
}

#[derive(Serialize)]
struct SketchOut<'a> {
    layers: Vec<LayerOut<'a>>,
    #[serde(rename = "activeLayerId")]
    active_layer_id: Option<&'a LayerId>,
    #[serde(rename = "WORLD_WIDTH")]
    world_width: u32,
    #[serde(rename = "WORLD_HEIGHT")]
    world_height: u32,
    #[serde(rename = "viewTransform")]
    view_transform: ViewTransform,
}

#[derive(Deserialize)]
struct SketchIn {
    layers: Option<Vec<LayerIn>>,
    #[serde(rename = "activeLayerId")]
    active_layer_id: Option<serde_json::Value>,
    #[serde(rename = "viewTransform")]
    view_transform: Option<ViewTransform>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct LayerIn {
    id: Option<serde_json::Value>,
    name: Option<String>,
    strokes: Option<Vec<StrokeIn>>,
    animation_settings: Option<AnimationIn>,
    is_visible: Option<bool>,
    opacity: Option<f64>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct AnimationIn {
    wiggle_intensity: Option<f64>,
    breathing_stroke: Option<f64>,
    shake_intensity: Option<f64>,
    animation_speed: Option<f64>,
}

impl AnimationIn {
    fn merged_over(self, base: AnimationSettings) -> AnimationSettings {
        AnimationSettings {
            wiggle_intensity: self.wiggle_intensity.unwrap_or(base.wiggle_intensity),
            breathing_stroke: self.breathing_stroke.unwrap_or(base.breathing_stroke),
            shake_intensity: self.shake_intensity.unwrap_or(base.shake_intensity),
            animation_speed: self.animation_speed.unwrap_or(base.animation_speed),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct StrokeIn {
    id: Option<serde_json::Value>,
    points: Vec<Point>,
    color: Option<String>,
    size: Option<f64>,
    tool: Option<Tool>,
    original_size: Option<f64>,
    birth_time: Option<f64>,
}

/// Older files wrote numeric ids; both forms are accepted.
fn id_text(v: Option<serde_json::Value>) -> Option<String> {
    match v? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Serialize a document to the `.drz` JSON format.
///
/// Refuses documents with no strokes at all.
pub fn to_json(doc: &Document) -> DrawerzResult<String> {
    let out = sketch_out(doc)?;
    serde_json::to_string(&out)
        .map_err(|e| DrawerzError::Other(anyhow::anyhow!("serialize sketch: {e}")))
}

fn sketch_out(doc: &Document) -> DrawerzResult<SketchOut<'_>> {
    if doc.layers.is_empty() || doc.is_empty() {
        return Err(DrawerzError::precondition("Canvas empty."));
    }
    Ok(SketchOut {
        layers: doc
            .layers
            .iter()
            .map(|l| LayerOut {
                id: &l.id,
                name: &l.name,
                strokes: &l.strokes,
                animation_settings: &l.animation_settings,
                is_visible: l.is_visible,
                opacity: l.opacity,
                is_active: doc.is_active(&l.id),
            })
            .collect(),
        active_layer_id: doc.active_layer_id.as_ref(),
        world_width: WORLD_WIDTH,
        world_height: WORLD_HEIGHT,
        view_transform: doc.view_transform,
    })
}

/// Write a document as `.drz` JSON.
pub fn to_writer(doc: &Document, w: impl Write) -> DrawerzResult<()> {
    let out = sketch_out(doc)?;
    let mut w = BufWriter::new(w);
    serde_json::to_writer(&mut w, &out)
        .map_err(|e| DrawerzError::Other(anyhow::anyhow!("serialize sketch: {e}")))?;
    w.flush()
        .map_err(|e| DrawerzError::Other(anyhow::anyhow!("flush sketch: {e}")))
}

/// Save a document to disk.
pub fn to_path(doc: &Document, path: impl AsRef<Path>) -> DrawerzResult<()> {
    let path = path.as_ref();
    let f = File::create(path).map_err(|e| {
        DrawerzError::Other(anyhow::anyhow!("create sketch '{}': {e}", path.display()))
    })?;
    to_writer(doc, f)
}

/// Parse and normalize a `.drz` document. `defaults` fills missing animation settings.
pub fn from_json(json: &str, defaults: AnimationSettings) -> DrawerzResult<Document> {
    let raw: SketchIn = serde_json::from_str(json)
        .map_err(|e| DrawerzError::parse(format!("Could not load sketch. {e}")))?;
    normalize(raw, defaults)
}

/// Parse a `.drz` document from a reader.
pub fn from_reader(mut r: impl Read, defaults: AnimationSettings) -> DrawerzResult<Document> {
    let mut s = String::new();
    r.read_to_string(&mut s)
        .map_err(|e| DrawerzError::parse(format!("Error reading file. {e}")))?;
    from_json(&s, defaults)
}

/// Load a `.drz` document from disk.
#[tracing::instrument(skip(path, defaults), fields(path = %path.as_ref().display()))]
pub fn from_path(path: impl AsRef<Path>, defaults: AnimationSettings) -> DrawerzResult<Document> {
    let path = path.as_ref();
    let f = File::open(path).map_err(|e| {
        DrawerzError::parse(format!("open sketch '{}': {e}", path.display()))
    })?;
    from_reader(BufReader::new(f), defaults)
}

/// Replace `doc` with the parsed sketch as one undoable step. `doc` is untouched on error.
pub fn load_into(
    doc: &mut Document,
    history: &mut History,
    json: &str,
    defaults: AnimationSettings,
) -> DrawerzResult<()> {
    let loaded = from_json(json, defaults)?;
    history.record_document(doc);
    *doc = loaded;
    tracing::info!(
        layers = doc.layers.len(),
        strokes = doc.stroke_count(),
        "sketch loaded"
    );
    Ok(())
}

fn normalize(raw: SketchIn, defaults: AnimationSettings) -> DrawerzResult<Document> {
    let Some(raw_layers) = raw.layers else {
        return Err(DrawerzError::parse("Invalid .drz file. Missing 'layers' data."));
    };

    let mut layer_ids: HashSet<String> = HashSet::new();
    let mut stroke_ids: HashSet<String> = HashSet::new();
    let mut layers = Vec::with_capacity(raw_layers.len());

    for rl in raw_layers {
        let settings = rl
            .animation_settings
            .unwrap_or_default()
            .merged_over(defaults);
        let mut layer = Layer::new(
            rl.name.unwrap_or_else(|| LOADED_LAYER_NAME.to_owned()),
            settings,
        );
        if let Some(id) = id_text(rl.id).filter(|id| !layer_ids.contains(id)) {
            layer.id = LayerId::from(id);
        }
        layer_ids.insert(layer.id.to_string());
        layer.is_visible = rl.is_visible.unwrap_or(true);
        layer.set_opacity(rl.opacity.unwrap_or(1.0) as f32);
        layer.strokes = rl
            .strokes
            .unwrap_or_default()
            .into_iter()
            .filter_map(|rs| normalize_stroke(rs, &mut stroke_ids))
            .collect();
        layers.push(layer);
    }

    if layers.is_empty() {
        tracing::warn!("sketch has no layers, starting with a blank one");
        return Ok(Document::new(defaults));
    }

    let wanted = id_text(raw.active_layer_id);
    let active = wanted
        .and_then(|w| layers.iter().find(|l| l.id.as_str() == w))
        .or_else(|| layers.last())
        .map(|l| l.id.clone());

    Ok(Document {
        layers,
        active_layer_id: active,
        view_transform: raw.view_transform.unwrap_or_default(),
    })
}

fn normalize_stroke(rs: StrokeIn, seen: &mut HashSet<String>) -> Option<Stroke> {
    if rs.points.is_empty() || rs.tool.unwrap_or(Tool::Pen) != Tool::Pen {
        return None;
    }
    let color = match rs.color.as_deref().map(str::parse::<StrokeColor>) {
        Some(Ok(c)) => c,
        Some(Err(e)) => {
            tracing::warn!(error = %e, "stroke color unreadable, using black");
            StrokeColor::BLACK
        }
        None => StrokeColor::BLACK,
    };
    let size = rs.size.or(rs.original_size).unwrap_or(10.0);
    let mut stroke = Stroke::from_points(rs.points, color, size, rs.birth_time.unwrap_or(0.0));
    stroke.original_size = rs.original_size.unwrap_or(size);
    if let Some(id) = id_text(rs.id).filter(|id| !seen.contains(id)) {
        stroke.id = StrokeId::from(id);
    }
    seen.insert(stroke.id.to_string());
    Some(stroke)
}

#[cfg(test)]
#[path = "../../tests/unit/io/sketch.rs"]
mod tests;
