use super::{Edge, SubGraph};
use crate::{
    error::{Error, Result},
    graph::Labels,
    types::Color,
};
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "subgraph/pattern.pest"]
struct PatternParser;

/// Parses the text form produced by [`SubGraph::display`].
///
/// The vertex and edge order of the text is kept, so the text of a
/// canonical pattern parses back to the same pattern.
pub fn parse(input: &str, labels: &Labels) -> Result<SubGraph> {
    let pattern = PatternParser::parse(Rule::pattern, input)?
        .next()
        .ok_or_else(|| Error::Parse(String::from("empty input")))?;
    let mut pairs = pattern.into_inner();
    let num_edges = parse_count(pairs.next())?;
    let num_vertices = parse_count(pairs.next())?;
    let (mut colors, mut edges) = (vec![], vec![]);
    for pair in pairs {
        match pair.as_rule() {
            Rule::vertex => {
                let mut inner = pair.into_inner();
                let idx = parse_count(inner.next())?;
                if idx != colors.len() {
                    return Err(Error::Parse(format!(
                        "vertex {} out of order, expected {}",
                        idx,
                        colors.len()
                    )));
                }
                colors.push(parse_name(inner.next(), labels)?);
            }
            Rule::edge => {
                let mut inner = pair.into_inner();
                let src = parse_count(inner.next())?;
                let targ = parse_count(inner.next())?;
                let color = parse_name(inner.next(), labels)?;
                if src >= num_vertices || targ >= num_vertices {
                    return Err(Error::Parse(format!(
                        "edge {}->{} refers to a missing vertex",
                        src, targ
                    )));
                }
                edges.push(Edge { src, targ, color });
            }
            Rule::EOI => {}
            rule => return Err(Error::Parse(format!("unexpected {:?}", rule))),
        }
    }
    if colors.len() != num_vertices || edges.len() != num_edges {
        return Err(Error::Parse(format!(
            "expected {} edges and {} vertices, found {} and {}",
            num_edges,
            num_vertices,
            edges.len(),
            colors.len()
        )));
    }
    Ok(SubGraph::from_parts(colors, edges))
}

fn parse_count(pair: Option<pest::iterators::Pair<Rule>>) -> Result<usize> {
    let pair = pair.ok_or_else(|| Error::Parse(String::from("missing count")))?;
    pair.as_str()
        .parse()
        .map_err(|_| Error::Parse(format!("invalid count {:?}", pair.as_str())))
}

fn parse_name(pair: Option<pest::iterators::Pair<Rule>>, labels: &Labels) -> Result<Color> {
    let name = pair.map_or("", |pair| pair.as_str());
    labels
        .color(name)
        .ok_or_else(|| Error::Parse(format!("unknown label {:?}", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_labels() -> Labels {
        let mut labels = Labels::new();
        labels.intern("black");
        labels.intern("red");
        labels.intern("");
        labels
    }

    #[test]
    fn test_parse() {
        let labels = create_labels();
        let sg = parse("1:2(0:black)(1:red)[0->1:]", &labels).unwrap();
        assert_eq!(sg.num_vertices(), 2);
        assert_eq!(sg.num_edges(), 1);
        assert_eq!(sg.vertices()[1].color, 1);
        assert_eq!(
            sg.edges()[0],
            Edge {
                src: 0,
                targ: 1,
                color: 2
            }
        );
        assert_eq!(
            sg.display(&labels).to_string(),
            "1:2(0:black)(1:red)[0->1:]"
        );
    }

    #[test]
    fn test_parse_singleton() {
        let labels = create_labels();
        let sg = parse("0:1(0:black)", &labels).unwrap();
        assert_eq!(sg.level(), 1);
    }

    #[test]
    fn test_parse_errors() {
        let labels = create_labels();
        assert!(parse("1:2(0:black)(1:red)", &labels).is_err());
        assert!(parse("0:1(0:blue)", &labels).is_err());
        assert!(parse("1:2(0:black)(1:red)[0->2:]", &labels).is_err());
        assert!(parse("0:1(1:black)", &labels).is_err());
        assert!(parse("zero", &labels).is_err());
    }

    #[test]
    fn test_malformed_input_is_a_parse_error() {
        let labels = create_labels();
        for input in &[
            "1:2[0->1:](0:black)(1:red)",
            "1:2(0:black)(1:red)[0->1:]trailing",
            "1:2(0:black)(1:red)[0-1:]",
            "",
        ] {
            assert!(
                matches!(parse(input, &labels), Err(Error::Parse(_))),
                "{:?}",
                input
            );
        }
    }
}
