use std::collections::HashMap;

use quick_xml::{Reader, events::BytesStart, events::Event};

use crate::{
    foundation::{
        color::StrokeColor,
        core::{Point, WORLD_HEIGHT, WORLD_WIDTH},
        error::{DrawerzError, DrawerzResult},
    },
    history::History,
    model::{document::Document, document::LayerOpError, stroke::Stroke},
};

/// Share of the limiting world axis the imported drawing occupies.
const FIT_FRACTION: f64 = 0.9;
/// Angular step used to tessellate circles and ellipses.
const ARC_STEP_DEG: usize = 15;
/// `Z` only appends the subpath start when the pen is farther than this (world units, per axis).
const CLOSE_EPSILON: f64 = 0.1;

/// One shape converted to a stroke-ready polyline in world space.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportedShape {
    /// World-space polyline.
    pub points: Vec<Point>,
    /// Stroke color from the element, or the fallback.
    pub color: StrokeColor,
    /// Stroke width from the element, or the fallback.
    pub width: f64,
}

/// Maps user units of the source document into the centered world-space fit.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Fit {
    vb_x: f64,
    vb_y: f64,
    vb_w: f64,
    vb_h: f64,
    scale: f64,
}

impl Fit {
    fn new(vb_x: f64, vb_y: f64, vb_w: f64, vb_h: f64) -> DrawerzResult<Self> {
        if !(vb_w.is_finite() && vb_h.is_finite() && vb_w > 0.0 && vb_h > 0.0) {
            return Err(DrawerzError::parse(
                "SVG needs a viewBox or positive width/height",
            ));
        }
        let world_w = f64::from(WORLD_WIDTH);
        let world_h = f64::from(WORLD_HEIGHT);
        let scale = (world_w / vb_w).min(world_h / vb_h) * FIT_FRACTION;
        Ok(Self {
            vb_x,
            vb_y,
            vb_w,
            vb_h,
            scale,
        })
    }

    fn from_root(attrs: &HashMap<String, String>) -> DrawerzResult<Self> {
        let mut vb_x = 0.0;
        let mut vb_y = 0.0;
        let mut vb_w = attr_f64(attrs, "width").unwrap_or(f64::NAN);
        let mut vb_h = attr_f64(attrs, "height").unwrap_or(f64::NAN);
        if let Some(vb) = attrs.get("viewBox") {
            let parts: Vec<Option<f64>> = vb
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|p| !p.is_empty())
                .map(parse_float_prefix)
                .collect();
            let part = |i: usize| parts.get(i).copied().flatten();
            vb_x = part(0).unwrap_or(0.0);
            vb_y = part(1).unwrap_or(0.0);
            vb_w = part(2).filter(|v| *v != 0.0).unwrap_or(vb_w);
            vb_h = part(3).filter(|v| *v != 0.0).unwrap_or(vb_h);
        }
        Self::new(vb_x, vb_y, vb_w, vb_h)
    }

    fn apply(&self, x: f64, y: f64) -> Point {
        let world_w = f64::from(WORLD_WIDTH);
        let world_h = f64::from(WORLD_HEIGHT);
        Point::new(
            (x - self.vb_x) * self.scale + (world_w - self.vb_w * self.scale) / 2.0,
            (y - self.vb_y) * self.scale + (world_h - self.vb_h * self.scale) / 2.0,
        )
    }
}

/// Parse vector markup into world-space polylines.
///
/// Supported elements are `path`, `line`, `rect`, `circle`, `ellipse`, `polyline` and
/// `polygon`. Paths honor absolute `M`/`L` and `Z`/`z`; every other path command is skipped.
/// Elements without usable geometry are skipped; malformed XML fails the whole parse.
pub fn parse_svg(
    markup: &str,
    fallback_color: StrokeColor,
    fallback_width: f64,
) -> DrawerzResult<Vec<ImportedShape>> {
    let mut reader = Reader::from_str(markup);
    reader.config_mut().trim_text(true);

    let mut buffer = Vec::new();
    let mut fit: Option<Fit> = None;
    let mut shapes = Vec::new();

    loop {
        match reader.read_event_into(&mut buffer) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let tag = local_tag(e)?;
                let attrs = attributes(e)?;
                match fit {
                    None => {
                        if tag != "svg" {
                            return Err(DrawerzError::parse(format!(
                                "expected <svg> root element, found <{tag}>"
                            )));
                        }
                        fit = Some(Fit::from_root(&attrs)?);
                    }
                    Some(f) => {
                        let points = element_points(&tag, &attrs, &f).unwrap_or_default();
                        if !points.is_empty() {
                            shapes.push(ImportedShape {
                                points,
                                color: stroke_color(&attrs).unwrap_or(fallback_color),
                                width: stroke_width(&attrs).unwrap_or(fallback_width),
                            });
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(DrawerzError::parse(format!(
                    "malformed SVG at byte {}: {err}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }

        buffer.clear();
    }

    if fit.is_none() {
        return Err(DrawerzError::parse("document has no <svg> root element"));
    }
    tracing::debug!(shapes = shapes.len(), "parsed SVG");
    Ok(shapes)
}

/// Parse `markup` and append one pen stroke per shape to the active layer.
///
/// The document is untouched on any error. One history snapshot is recorded when at least one
/// shape is imported. Returns the number of strokes added.
#[tracing::instrument(skip(doc, history, markup), fields(bytes = markup.len()))]
pub fn import_svg(
    doc: &mut Document,
    history: &mut History,
    markup: &str,
    fallback_color: StrokeColor,
    fallback_width: f64,
    now: f64,
) -> DrawerzResult<usize> {
    if doc.active_layer().is_none() {
        return Err(LayerOpError::NoActiveLayer.into());
    }
    let shapes = parse_svg(markup, fallback_color, fallback_width)?;
    if shapes.is_empty() {
        tracing::info!("SVG contained no importable shapes");
        return Ok(0);
    }
    history.record_document(doc);
    let layer = doc
        .active_layer_mut()
        .ok_or(LayerOpError::NoActiveLayer)?;
    let n = shapes.len();
    layer.strokes.extend(
        shapes
            .into_iter()
            .map(|s| Stroke::from_points(s.points, s.color, s.width, now)),
    );
    tracing::info!(strokes = n, "imported SVG shapes");
    Ok(n)
}

fn local_tag(e: &BytesStart<'_>) -> DrawerzResult<String> {
    let name = e.local_name();
    std::str::from_utf8(name.as_ref())
        .map(|s| s.to_ascii_lowercase())
        .map_err(|err| DrawerzError::parse(format!("invalid element name: {err}")))
}

fn attributes(e: &BytesStart<'_>) -> DrawerzResult<HashMap<String, String>> {
    let mut out = HashMap::new();
    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(|err| DrawerzError::parse(format!("bad attribute: {err}")))?;
        let key = std::str::from_utf8(attr.key.local_name().as_ref())
            .map_err(|err| DrawerzError::parse(format!("invalid attribute name: {err}")))?
            .to_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| DrawerzError::parse(format!("bad attribute value: {err}")))?
            .into_owned();
        out.insert(key, value);
    }
    Ok(out)
}

fn element_points(tag: &str, attrs: &HashMap<String, String>, fit: &Fit) -> Option<Vec<Point>> {
    let coord = |k: &str| attr_f64(attrs, k).unwrap_or(0.0);
    let length = |k: &str| attr_f64(attrs, k);
    match tag {
        "path" => Some(path_points(attrs.get("d").map(String::as_str)?, fit)),
        "line" => Some(vec![
            fit.apply(coord("x1"), coord("y1")),
            fit.apply(coord("x2"), coord("y2")),
        ]),
        "rect" => {
            let (x, y) = (coord("x"), coord("y"));
            let (w, h) = (length("width")?, length("height")?);
            Some(vec![
                fit.apply(x, y),
                fit.apply(x + w, y),
                fit.apply(x + w, y + h),
                fit.apply(x, y + h),
                fit.apply(x, y),
            ])
        }
        "circle" => {
            let r = length("r")?;
            Some(arc_points(coord("cx"), coord("cy"), r, r, fit))
        }
        "ellipse" => Some(arc_points(
            coord("cx"),
            coord("cy"),
            length("rx")?,
            length("ry")?,
            fit,
        )),
        "polyline" | "polygon" => {
            let nums: Vec<f64> = attrs
                .get("points")?
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|t| !t.is_empty())
                .filter_map(parse_float_prefix)
                .collect();
            let mut pts: Vec<Point> = nums
                .chunks_exact(2)
                .map(|xy| fit.apply(xy[0], xy[1]))
                .collect();
            if tag == "polygon" {
                if let Some(&first) = pts.first() {
                    pts.push(first);
                }
            }
            Some(pts)
        }
        _ => None,
    }
}

fn arc_points(cx: f64, cy: f64, rx: f64, ry: f64, fit: &Fit) -> Vec<Point> {
    (0..=360)
        .step_by(ARC_STEP_DEG)
        .map(|deg| {
            let a = (deg as f64).to_radians();
            fit.apply(cx + rx * a.cos(), cy + ry * a.sin())
        })
        .collect()
}

fn path_points(d: &str, fit: &Fit) -> Vec<Point> {
    let mut points: Vec<Point> = Vec::new();
    let mut subpath_start: Option<(f64, f64)> = None;

    for (cmd, args) in path_commands(d) {
        match cmd {
            'M' => {
                let mut pairs = args.chunks_exact(2);
                if let Some(first) = pairs.next() {
                    subpath_start = Some((first[0], first[1]));
                    points.push(fit.apply(first[0], first[1]));
                }
                points.extend(pairs.map(|xy| fit.apply(xy[0], xy[1])));
            }
            'L' => points.extend(args.chunks_exact(2).map(|xy| fit.apply(xy[0], xy[1]))),
            'Z' | 'z' => {
                if let (Some((sx, sy)), Some(&last)) = (subpath_start, points.last()) {
                    let start = fit.apply(sx, sy);
                    if (last.x - start.x).abs() > CLOSE_EPSILON
                        || (last.y - start.y).abs() > CLOSE_EPSILON
                    {
                        points.push(start);
                    }
                }
                subpath_start = None;
            }
            _ => {}
        }
    }
    points
}

/// Split path data into command letters and their numeric arguments.
fn path_commands(d: &str) -> Vec<(char, Vec<f64>)> {
    let mut out: Vec<(char, String)> = Vec::new();
    for c in d.chars() {
        if c.is_ascii_alphabetic() {
            out.push((c, String::new()));
        } else if let Some((_, args)) = out.last_mut() {
            args.push(c);
        }
    }
    out.into_iter()
        .map(|(c, args)| (c, path_numbers(&args)))
        .collect()
}

/// Numbers of the form `-?\d*\.?\d+`, scanned left to right.
fn path_numbers(s: &str) -> Vec<f64> {
    let b = s.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < b.len() {
        let start = i;
        let mut j = i;
        if b[j] == b'-' {
            j += 1;
        }
        let int_start = j;
        while j < b.len() && b[j].is_ascii_digit() {
            j += 1;
        }
        let has_int = j > int_start;
        let mut end = None;
        if j < b.len() && b[j] == b'.' {
            let frac_start = j + 1;
            let mut k = frac_start;
            while k < b.len() && b[k].is_ascii_digit() {
                k += 1;
            }
            if k > frac_start {
                end = Some(k);
            }
        }
        if end.is_none() && has_int {
            end = Some(j);
        }
        match end.and_then(|e| s[start..e].parse::<f64>().ok().map(|v| (e, v))) {
            Some((e, v)) => {
                out.push(v);
                i = e;
            }
            None => i = start + 1,
        }
    }
    out
}

/// Leading decimal number of `s`, ignoring trailing units (`"12px"` is 12).
fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let b = s.as_bytes();
    let mut end = 0;
    if end < b.len() && (b[end] == b'+' || b[end] == b'-') {
        end += 1;
    }
    let digits_start = end;
    while end < b.len() && b[end].is_ascii_digit() {
        end += 1;
    }
    if end < b.len() && b[end] == b'.' {
        end += 1;
        while end < b.len() && b[end].is_ascii_digit() {
            end += 1;
        }
    }
    if end == digits_start || (end == digits_start + 1 && b[digits_start] == b'.') {
        return None;
    }
    if end < b.len() && (b[end] == b'e' || b[end] == b'E') {
        let mut k = end + 1;
        if k < b.len() && (b[k] == b'+' || b[k] == b'-') {
            k += 1;
        }
        let exp_digits = k;
        while k < b.len() && b[k].is_ascii_digit() {
            k += 1;
        }
        if k > exp_digits {
            end = k;
        }
    }
    s[..end].parse().ok()
}

fn attr_f64(attrs: &HashMap<String, String>, key: &str) -> Option<f64> {
    attrs
        .get(key)
        .and_then(|v| parse_float_prefix(v))
        .filter(|v| v.is_finite())
}

fn style_property<'a>(attrs: &'a HashMap<String, String>, prop: &str) -> Option<&'a str> {
    attrs.get("style")?.split(';').find_map(|decl| {
        let (k, v) = decl.split_once(':')?;
        (k.trim() == prop).then(|| v.trim())
    })
}

fn stroke_color(attrs: &HashMap<String, String>) -> Option<StrokeColor> {
    attrs
        .get("stroke")
        .map(String::as_str)
        .or_else(|| style_property(attrs, "stroke"))
        .and_then(StrokeColor::from_css)
}

fn stroke_width(attrs: &HashMap<String, String>) -> Option<f64> {
    attrs
        .get("stroke-width")
        .map(String::as_str)
        .or_else(|| style_property(attrs, "stroke-width"))
        .and_then(parse_float_prefix)
        .filter(|w| w.is_finite() && *w > 0.0)
}

#[cfg(test)]
#[path = "../../tests/unit/import/svg.rs"]
mod tests;
