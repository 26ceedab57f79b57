//! SVG to polygon conversion.
//!
//! Only a small subset of SVG is supported: `<path>` elements (optionally
//! nested in `<g>` groups) with `translate`/`matrix` transform attributes
//! and path data restricted to the `M/m`, `L/l`, `C/c`, `S/s` and `Z/z`
//! commands. Cubic segments are flattened into line strips. Files produced
//! by Inkscape with "make selected nodes corner" applied convert cleanly.

use crate::bezier::{flatten_cubic_bezier, DEFAULT_FLATNESS};
use crate::polygon::Polygon;
use crate::primitives::Vec2;
use crate::transform::Transform;
use num_traits::Float;
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised by the SVG importer.
#[derive(Debug, Error)]
pub enum SvgError {
    /// The document is not well-formed XML.
    #[error("malformed SVG document: {0}")]
    Xml(#[from] roxmltree::Error),

    /// A coordinate or transform parameter failed to parse.
    #[error("malformed number {0:?} in SVG data")]
    Number(String),

    /// Path data violates the supported command grammar.
    #[error("malformed path data: {0}")]
    Path(String),
}

/// Converts an SVG document to polygons, keyed by `<path>` element id.
///
/// Each value holds the polygons of one path: the first entry is the
/// outline, any further entries are holes (additional closed contours).
/// `transform` is applied to every polygon on top of the transforms found
/// in the document. Paths with unsupported drawing commands are skipped
/// with a warning and yield an empty polygon list.
pub fn convert_svg_str<F: Float>(
    xml: &str,
    transform: &Transform<F>,
) -> Result<HashMap<String, Vec<Polygon<F>>>, SvgError> {
    let flatness = F::from(DEFAULT_FLATNESS).unwrap();
    convert_svg_str_with(xml, transform, None, flatness)
}

/// [`convert_svg_str`] with explicit bezier flattening controls.
pub fn convert_svg_str_with<F: Float>(
    xml: &str,
    transform: &Transform<F>,
    bezier_max_divisions: Option<u32>,
    bezier_max_flatness: F,
) -> Result<HashMap<String, Vec<Polygon<F>>>, SvgError> {
    let doc = roxmltree::Document::parse(xml)?;

    let mut out = HashMap::new();
    walk(
        doc.root_element(),
        *transform,
        bezier_max_divisions,
        bezier_max_flatness,
        &mut out,
    )?;
    Ok(out)
}

fn walk<F: Float>(
    node: roxmltree::Node<'_, '_>,
    transform: Transform<F>,
    divisions: Option<u32>,
    flatness: F,
    out: &mut HashMap<String, Vec<Polygon<F>>>,
) -> Result<(), SvgError> {
    for child in node.children() {
        if !child.is_element() {
            continue;
        }
        match child.tag_name().name() {
            "path" => {
                let t = element_transform(&child, transform)?;
                let id = child.attribute("id").unwrap_or_default().to_string();
                let d = child.attribute("d").unwrap_or_default();
                out.insert(id, parse_path_data(d, &t, divisions, flatness)?);
            }
            "g" => {
                let t = element_transform(&child, transform)?;
                walk(child, t, divisions, flatness, out)?;
            }
            _ => {}
        }
    }
    Ok(())
}

/// Composes a node's `transform` attribute onto the inherited transform.
/// The local transform applies first, as SVG requires.
fn element_transform<F: Float>(
    node: &roxmltree::Node<'_, '_>,
    inherited: Transform<F>,
) -> Result<Transform<F>, SvgError> {
    let attr = match node.attribute("transform") {
        Some(a) => a.trim(),
        None => return Ok(inherited),
    };

    if let Some(args) = function_args(attr, "translate") {
        let v = parse_numbers::<F>(&args)?;
        if v.len() != 2 {
            return Err(SvgError::Path(format!("bad translate arguments: {attr:?}")));
        }
        return Ok(inherited * Transform::translate(v[0], v[1]));
    }

    if let Some(args) = function_args(attr, "matrix") {
        let v = parse_numbers::<F>(&args)?;
        if v.len() != 6 {
            return Err(SvgError::Path(format!("bad matrix arguments: {attr:?}")));
        }
        // SVG matrix(a,b,c,d,e,f) is column-major.
        let m = Transform::new(v[0], v[2], v[1], v[3], v[4], v[5]);
        return Ok(inherited * m);
    }

    Ok(inherited)
}

/// Extracts the argument string of `name(...)` when `s` starts with it.
fn function_args(s: &str, name: &str) -> Option<String> {
    let rest = s.strip_prefix(name)?.trim_start();
    let inner = rest.strip_prefix('(')?;
    let end = inner.find(')')?;
    Some(inner[..end].to_string())
}

fn parse_numbers<F: Float>(s: &str) -> Result<Vec<F>, SvgError> {
    s.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(parse_number)
        .collect()
}

fn parse_number<F: Float>(s: &str) -> Result<F, SvgError> {
    s.trim()
        .parse::<f64>()
        .ok()
        .and_then(F::from)
        .ok_or_else(|| SvgError::Number(s.to_string()))
}

fn parse_vec<F: Float>(s: &str) -> Result<Vec2<F>, SvgError> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| SvgError::Path(format!("expected coordinate pair, got {s:?}")))?;
    Ok(Vec2::new(parse_number(x)?, parse_number(y)?))
}

/// Parses one SVG path data string into polygons.
///
/// Every `z`/`Z` closes the current contour; remaining vertices at the end
/// of the data form a final (implicitly closed) polygon. An unrecognized
/// command logs a warning and discards the whole path.
pub fn parse_path_data<F: Float>(
    d: &str,
    transform: &Transform<F>,
    bezier_max_divisions: Option<u32>,
    bezier_max_flatness: F,
) -> Result<Vec<Polygon<F>>, SvgError> {
    let tokens: Vec<&str> = d.split_whitespace().collect();
    let is_command = |t: &str| t.len() == 1 && t.chars().all(|c| c.is_ascii_alphabetic());

    let mut polys: Vec<Polygon<F>> = Vec::new();
    let mut verts: Vec<Vec2<F>> = Vec::new();
    let mut pos = Vec2::zero();
    let mut last_control: Option<Vec2<F>> = None;

    let mut i = 0;
    while i < tokens.len() {
        let cmd = tokens[i];
        let mut j = i + 1;
        while j < tokens.len() && !is_command(tokens[j]) {
            j += 1;
        }
        let pars = &tokens[i + 1..j];
        i = j;

        match cmd {
            "m" | "l" => {
                for p in pars {
                    pos = pos + parse_vec(p)?;
                    verts.push(pos);
                }
            }
            "M" | "L" => {
                for p in pars {
                    pos = parse_vec(p)?;
                    verts.push(pos);
                }
            }
            "c" | "C" => {
                if pars.len() % 3 != 0 {
                    return Err(SvgError::Path(format!(
                        "cubic command needs parameter triples, got {} parameters",
                        pars.len()
                    )));
                }
                for triple in pars.chunks(3) {
                    let mut c1 = parse_vec(triple[0])?;
                    let mut c2 = parse_vec(triple[1])?;
                    let mut b = parse_vec(triple[2])?;
                    if cmd == "c" {
                        c1 = c1 + pos;
                        c2 = c2 + pos;
                        b = b + pos;
                    }

                    verts.extend(flatten_cubic_bezier(
                        pos,
                        b,
                        c1,
                        c2,
                        bezier_max_divisions,
                        bezier_max_flatness,
                    ));
                    verts.push(b);

                    last_control = Some(c2);
                    pos = b;
                }
            }
            "s" | "S" => {
                if pars.len() % 2 != 0 {
                    return Err(SvgError::Path(format!(
                        "smooth cubic command needs parameter pairs, got {} parameters",
                        pars.len()
                    )));
                }
                for pair in pars.chunks(2) {
                    let mut c2 = parse_vec(pair[0])?;
                    let mut b = parse_vec(pair[1])?;
                    // Reflect the previous control point through the
                    // current position.
                    let c1 = pos + (pos - last_control.unwrap_or(pos));
                    if cmd == "s" {
                        c2 = c2 + pos;
                        b = b + pos;
                    }

                    verts.extend(flatten_cubic_bezier(
                        pos,
                        b,
                        c1,
                        c2,
                        bezier_max_divisions,
                        bezier_max_flatness,
                    ));
                    verts.push(b);

                    last_control = Some(c2);
                    pos = b;
                }
            }
            "z" | "Z" => {
                if let Some(&first) = verts.first() {
                    polys.push(transform.apply_polygon(&Polygon::from_points(std::mem::take(
                        &mut verts,
                    ))));
                    pos = first;
                }
            }
            _ => {
                log::warn!("unrecognized SVG path command: {cmd} - path skipped");
                return Ok(Vec::new());
            }
        }
    }

    if !verts.is_empty() {
        polys.push(transform.apply_polygon(&Polygon::from_points(verts)));
    }

    Ok(polys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const NS: &str = r#"xmlns="http://www.w3.org/2000/svg""#;

    fn convert(xml: &str) -> HashMap<String, Vec<Polygon<f64>>> {
        convert_svg_str(xml, &Transform::identity()).unwrap()
    }

    #[test]
    fn test_absolute_path() {
        let svg = format!(r#"<svg {NS}><path id="tri" d="M 0,0 L 10,0 L 10,10 z"/></svg>"#);
        let out = convert(&svg);

        let polys = &out["tri"];
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].len(), 3);
        assert_relative_eq!(polys[0].area(), 50.0);
    }

    #[test]
    fn test_relative_path() {
        let svg = format!(r#"<svg {NS}><path id="t" d="m 1,1 l 2,0 l 0,2 z"/></svg>"#);
        let out = convert(&svg);

        let polys = &out["t"];
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].points[0], Vec2::new(1.0, 1.0));
        assert_eq!(polys[0].points[2], Vec2::new(3.0, 3.0));
        assert_relative_eq!(polys[0].area(), 2.0);
    }

    #[test]
    fn test_unclosed_path_forms_polygon() {
        let svg = format!(r#"<svg {NS}><path id="q" d="M 0,0 L 4,0 L 4,4 L 0,4"/></svg>"#);
        let out = convert(&svg);
        assert_relative_eq!(out["q"][0].area(), 16.0);
    }

    #[test]
    fn test_multiple_contours_give_outline_and_hole() {
        let svg = format!(
            r#"<svg {NS}><path id="ring"
                d="M 0,0 L 4,0 L 4,4 L 0,4 z M 1,1 L 2,1 L 2,2 L 1,2 z"/></svg>"#
        );
        let out = convert(&svg);

        let polys = &out["ring"];
        assert_eq!(polys.len(), 2);
        assert_relative_eq!(polys[0].area(), 16.0);
        assert_relative_eq!(polys[1].area(), 1.0);
    }

    #[test]
    fn test_group_translate() {
        let svg = format!(
            r#"<svg {NS}><g transform="translate(5,5)">
                 <path id="t" d="M 0,0 L 1,0 L 1,1 z"/>
               </g></svg>"#
        );
        let out = convert(&svg);

        let p = &out["t"][0];
        assert_eq!(p.points[0], Vec2::new(5.0, 5.0));
        assert_relative_eq!(p.area(), 0.5);
    }

    #[test]
    fn test_matrix_transform() {
        let svg = format!(
            r#"<svg {NS}><path id="t" transform="matrix(2,0,0,2,1,0)"
                 d="M 0,0 L 1,0 L 1,1 z"/></svg>"#
        );
        let out = convert(&svg);

        let p = &out["t"][0];
        assert_eq!(p.points[0], Vec2::new(1.0, 0.0));
        assert_relative_eq!(p.area(), 2.0);
    }

    #[test]
    fn test_cubic_curve_is_flattened() {
        let svg = format!(
            r#"<svg {NS}><path id="c" d="M 0,0 C 1,2 2,2 3,0 L 3,-1 L 0,-1 z"/></svg>"#
        );
        let out = convert(&svg);

        let p = &out["c"][0];
        // The curve contributes intermediate points between its endpoints.
        assert!(p.len() > 6);
        assert!(p.points.iter().any(|v| v.y > 0.5));
    }

    #[test]
    fn test_unknown_command_skips_path() {
        let svg = format!(
            r#"<svg {NS}>
                 <path id="bad" d="M 0,0 A 1,1"/>
                 <path id="good" d="M 0,0 L 1,0 L 1,1 z"/>
               </svg>"#
        );
        let out = convert(&svg);

        assert!(out["bad"].is_empty());
        assert_eq!(out["good"].len(), 1);
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        assert!(matches!(
            convert_svg_str::<f64>("<svg><path", &Transform::identity()),
            Err(SvgError::Xml(_))
        ));
    }

    #[test]
    fn test_malformed_number_is_an_error() {
        let svg = format!(r#"<svg {NS}><path id="t" d="M 0,zero L 1,0"/></svg>"#);
        assert!(matches!(
            convert_svg_str::<f64>(&svg, &Transform::identity()),
            Err(SvgError::Number(_))
        ));
    }
}
