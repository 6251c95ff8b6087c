use crate::learners::adaptive_tree::config::{ExportFormat, TaskType};
use crate::learners::adaptive_tree::node::{Node, NodeId};
use crate::learners::adaptive_tree::tree::AdaptiveHoeffdingTree;
use crate::learners::adaptive_tree::error::TreeError;
use serde_json::{Map, Value, json};
use std::io::Write;

impl AdaptiveHoeffdingTree {
    /// Serializes the current model for external inspection. Alternate
    /// subtrees appear under their host (dashed edges in DOT output).
    pub fn export<W: Write>(&self, writer: &mut W, format: ExportFormat) -> Result<(), TreeError> {
        match format {
            ExportFormat::Xml => self.export_xml(writer),
            ExportFormat::Json => self.export_json(writer),
            ExportFormat::Dot => self.export_dot(writer),
        }
    }

    fn node_name(&self, node: &Node) -> String {
        match node.split_test() {
            Some(test) => self
                .schema()
                .entry(test.attr())
                .map(|s| s.name().to_string())
                .unwrap_or_else(|| format!("attr{}", test.attr())),
            None => self.leaf_label(node),
        }
    }

    fn leaf_label(&self, node: &Node) -> String {
        match self.config().task {
            TaskType::Classification => self
                .schema()
                .label_token(node.majority())
                .unwrap_or("?")
                .to_string(),
            TaskType::Regression => {
                format!("{:.4}", node.stats().map_or(0.0, |s| s.target().mean()))
            }
        }
    }

    fn branch_label(&self, node: &Node, branch: usize) -> String {
        let test = node.split_test().expect("branches come from split nodes");
        match test.threshold() {
            Some(t) => {
                if branch == 0 {
                    format!("<= {t}")
                } else {
                    format!("> {t}")
                }
            }
            None => self
                .schema()
                .entry(test.attr())
                .and_then(|s| s.vocabulary())
                .and_then(|v| v.token_at(branch))
                .unwrap_or("?")
                .to_string(),
        }
    }

    fn export_xml<W: Write>(&self, writer: &mut W) -> Result<(), TreeError> {
        writeln!(writer, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        writeln!(
            writer,
            "<tree relation=\"{}\" task=\"{}\">",
            xml_escape(self.schema().relation()),
            self.config().task
        )?;
        self.write_xml_node(writer, self.root_id(), 1)?;
        writeln!(writer, "</tree>")?;
        Ok(())
    }

    fn write_xml_node<W: Write>(
        &self,
        writer: &mut W,
        id: NodeId,
        depth: usize,
    ) -> Result<(), TreeError> {
        let node = self.get(id).expect("exported node is in the arena");
        let pad = "  ".repeat(depth);
        match node.split_test() {
            Some(test) => {
                writeln!(
                    writer,
                    "{pad}<node id=\"{}\" test=\"{}\">",
                    node.id(),
                    xml_escape(&self.node_name(node))
                )?;
                for (branch, &child) in test.children().iter().enumerate() {
                    writeln!(
                        writer,
                        "{pad}  <branch value=\"{}\">",
                        xml_escape(&self.branch_label(node, branch))
                    )?;
                    self.write_xml_node(writer, child, depth + 2)?;
                    writeln!(writer, "{pad}  </branch>")?;
                }
                for &alt in node.alt_trees() {
                    writeln!(writer, "{pad}  <alternate>")?;
                    self.write_xml_node(writer, alt, depth + 2)?;
                    writeln!(writer, "{pad}  </alternate>")?;
                }
                writeln!(writer, "{pad}</node>")?;
            }
            None => {
                writeln!(
                    writer,
                    "{pad}<leaf id=\"{}\" prediction=\"{}\" examples=\"{}\"/>",
                    node.id(),
                    xml_escape(&self.leaf_label(node)),
                    node.stats().map_or(0, |s| s.examples_seen())
                )?;
            }
        }
        Ok(())
    }

    fn export_json<W: Write>(&self, writer: &mut W) -> Result<(), TreeError> {
        let value = json!({
            "relation": self.schema().relation(),
            "task": self.config().task.to_string(),
            "root": self.json_node(self.root_id()),
        });
        serde_json::to_writer_pretty(&mut *writer, &value)
            .map_err(std::io::Error::other)?;
        writeln!(writer)?;
        Ok(())
    }

    fn json_node(&self, id: NodeId) -> Value {
        let node = self.get(id).expect("exported node is in the arena");
        let mut map = Map::new();
        map.insert("id".into(), json!(node.id()));
        match node.split_test() {
            Some(test) => {
                map.insert("test".into(), json!(self.node_name(node)));
                if let Some(t) = test.threshold() {
                    map.insert("threshold".into(), json!(t));
                }
                let children: Vec<Value> = test
                    .children()
                    .iter()
                    .enumerate()
                    .map(|(branch, &child)| {
                        json!({
                            "branch": self.branch_label(node, branch),
                            "node": self.json_node(child),
                        })
                    })
                    .collect();
                map.insert("children".into(), Value::Array(children));
                if !node.alt_trees().is_empty() {
                    let alts: Vec<Value> = node
                        .alt_trees()
                        .iter()
                        .map(|&alt| self.json_node(alt))
                        .collect();
                    map.insert("alternates".into(), Value::Array(alts));
                }
            }
            None => {
                map.insert("prediction".into(), json!(self.leaf_label(node)));
                map.insert(
                    "examples".into(),
                    json!(node.stats().map_or(0, |s| s.examples_seen())),
                );
            }
        }
        Value::Object(map)
    }

    fn export_dot<W: Write>(&self, writer: &mut W) -> Result<(), TreeError> {
        writeln!(writer, "digraph \"{}\" {{", dot_escape(self.schema().relation()))?;
        writeln!(writer, "  node [fontname=\"Helvetica\"];")?;
        self.write_dot_node(writer, self.root_id())?;
        writeln!(writer, "}}")?;
        Ok(())
    }

    fn write_dot_node<W: Write>(&self, writer: &mut W, id: NodeId) -> Result<(), TreeError> {
        let node = self.get(id).expect("exported node is in the arena");
        match node.split_test() {
            Some(test) => {
                writeln!(
                    writer,
                    "  n{} [label=\"{}\"];",
                    node.id(),
                    dot_escape(&self.node_name(node))
                )?;
                for (branch, &child) in test.children().iter().enumerate() {
                    writeln!(
                        writer,
                        "  n{} -> n{} [label=\"{}\"];",
                        node.id(),
                        child,
                        dot_escape(&self.branch_label(node, branch))
                    )?;
                    self.write_dot_node(writer, child)?;
                }
                for &alt in node.alt_trees() {
                    writeln!(
                        writer,
                        "  n{} -> n{} [style=dashed, label=\"alt\"];",
                        node.id(),
                        alt
                    )?;
                    self.write_dot_node(writer, alt)?;
                }
            }
            None => {
                writeln!(
                    writer,
                    "  n{} [shape=box, label=\"{}\"];",
                    node.id(),
                    dot_escape(&self.leaf_label(node))
                )?;
            }
        }
        Ok(())
    }
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn dot_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
