//! Depth-first traversal of a process-group tree.
//!
//! The tree lives on the server and is fetched one node at a time through a
//! [`FlowSource`]. A [`FlowVisitor`] sees every node before any of its
//! children, and children in the order the server lists them.
//!
//! The server's hierarchy is trusted to be a tree. The walker keeps no
//! visited set; instead a node deeper than `max_depth` fails the walk with
//! [`AdapterError::DepthExceeded`], which also ends a cyclic listing.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::AdapterError;

/// Default limit on the depth of a walk (the root is depth 0).
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// One fetched process group.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowNode {
    pub id: String,
    /// Child process-group ids, in server order.
    pub children: Vec<String>,
    /// The raw descriptor returned by the server.
    pub payload: Value,
}

impl FlowNode {
    /// Decode the payload into a typed response.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, AdapterError> {
        serde_json::from_value(self.payload.clone()).map_err(|e| AdapterError::Decode {
            url: format!("process group {}", self.id),
            message: e.to_string(),
        })
    }
}

/// Fetches process-group descriptors.
#[async_trait]
pub trait FlowSource: Send + Sync {
    async fn fetch_node(&self, id: &str) -> Result<FlowNode, AdapterError>;
}

/// Receives every node of a walk.
#[async_trait]
pub trait FlowVisitor: Send {
    async fn visit(&mut self, node: &FlowNode, depth: usize) -> Result<(), AdapterError>;
}

/// Summary of a completed walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub visited: usize,
    pub max_depth_reached: usize,
}

/// Pre-order walker over a [`FlowSource`].
#[derive(Debug, Clone, Copy)]
pub struct FlowWalker {
    max_depth: usize,
}

impl Default for FlowWalker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl FlowWalker {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Visit `root_id` and everything below it.
    ///
    /// The first fetch or visitor error aborts the walk. Whatever earlier
    /// visits produced is left as is.
    pub async fn walk<S, V>(
        &self,
        source: &S,
        root_id: &str,
        visitor: &mut V,
    ) -> Result<WalkStats, AdapterError>
    where
        S: FlowSource + ?Sized,
        V: FlowVisitor + ?Sized,
    {
        let mut stats = WalkStats::default();
        let mut pending = vec![(root_id.to_string(), 0usize)];

        while let Some((id, depth)) = pending.pop() {
            if depth > self.max_depth {
                return Err(AdapterError::DepthExceeded {
                    id,
                    max_depth: self.max_depth,
                });
            }

            let node = source.fetch_node(&id).await?;
            debug!(id = %node.id, depth, children = node.children.len(), "visiting process group");

            visitor.visit(&node, depth).await?;
            stats.visited += 1;
            stats.max_depth_reached = stats.max_depth_reached.max(depth);

            // Reversed so the first child is popped first.
            for child in node.children.iter().rev() {
                pending.push((child.clone(), depth + 1));
            }
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::collections::HashMap;

    /// In-memory tree; ids missing from the map fail like a 404.
    struct MapSource {
        nodes: HashMap<String, Vec<String>>,
        fetched: Mutex<Vec<String>>,
    }

    impl MapSource {
        fn new(edges: &[(&str, &[&str])]) -> Self {
            Self {
                nodes: edges
                    .iter()
                    .map(|(id, children)| {
                        (
                            id.to_string(),
                            children.iter().map(|c| c.to_string()).collect(),
                        )
                    })
                    .collect(),
                fetched: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl FlowSource for MapSource {
        async fn fetch_node(&self, id: &str) -> Result<FlowNode, AdapterError> {
            self.fetched.lock().push(id.to_string());
            let children = self.nodes.get(id).ok_or_else(|| AdapterError::HttpStatus {
                method: "GET".to_string(),
                url: format!("/flow/process-groups/{}", id),
                status: 404,
            })?;
            Ok(FlowNode {
                id: id.to_string(),
                children: children.clone(),
                payload: json!({ "id": id }),
            })
        }
    }

    #[derive(Default)]
    struct Recorder {
        visits: Vec<(String, usize)>,
        fail_on: Option<String>,
    }

    #[async_trait]
    impl FlowVisitor for Recorder {
        async fn visit(&mut self, node: &FlowNode, depth: usize) -> Result<(), AdapterError> {
            if self.fail_on.as_deref() == Some(node.id.as_str()) {
                return Err(AdapterError::Http("visitor failed".to_string()));
            }
            self.visits.push((node.id.clone(), depth));
            Ok(())
        }
    }

    fn three_level_tree() -> MapSource {
        MapSource::new(&[
            ("root", &["a", "b", "c"]),
            ("a", &["a1", "a2"]),
            ("b", &[]),
            ("c", &["c1"]),
            ("a1", &[]),
            ("a2", &[]),
            ("c1", &[]),
        ])
    }

    #[tokio::test]
    async fn test_pre_order_in_server_order() {
        let source = three_level_tree();
        let mut recorder = Recorder::default();

        let stats = FlowWalker::default()
            .walk(&source, "root", &mut recorder)
            .await
            .unwrap();

        let order: Vec<&str> = recorder.visits.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(order, vec!["root", "a", "a1", "a2", "b", "c", "c1"]);
        assert_eq!(
            recorder.visits.iter().map(|(_, d)| *d).collect::<Vec<_>>(),
            vec![0, 1, 2, 2, 1, 1, 2]
        );
        assert_eq!(stats.visited, 7);
        assert_eq!(stats.max_depth_reached, 2);
    }

    #[tokio::test]
    async fn test_children_not_sorted() {
        let source = MapSource::new(&[("root", &["z", "m", "a"]), ("z", &[]), ("m", &[]), ("a", &[])]);
        let mut recorder = Recorder::default();

        FlowWalker::default()
            .walk(&source, "root", &mut recorder)
            .await
            .unwrap();

        let order: Vec<&str> = recorder.visits.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(order, vec!["root", "z", "m", "a"]);
    }

    #[tokio::test]
    async fn test_one_visit_per_node_for_any_branching() {
        for width in 1..=4usize {
            let mut edges: Vec<(String, Vec<String>)> = Vec::new();
            let level1: Vec<String> = (0..width).map(|i| format!("g{}", i)).collect();
            edges.push(("root".to_string(), level1.clone()));
            for g in &level1 {
                let level2: Vec<String> = (0..width).map(|i| format!("{}-{}", g, i)).collect();
                for leaf in &level2 {
                    edges.push((leaf.clone(), Vec::new()));
                }
                edges.push((g.clone(), level2));
            }

            let source = MapSource {
                nodes: edges.into_iter().collect(),
                fetched: Mutex::new(Vec::new()),
            };
            let mut recorder = Recorder::default();

            let stats = FlowWalker::default()
                .walk(&source, "root", &mut recorder)
                .await
                .unwrap();

            let expected = 1 + width + width * width;
            assert_eq!(recorder.visits.len(), expected);
            assert_eq!(stats.visited, expected);
            assert_eq!(source.fetched.lock().len(), expected);
        }
    }

    #[tokio::test]
    async fn test_self_cycle_hits_depth_limit() {
        let source = MapSource::new(&[("A", &["A"])]);
        let mut recorder = Recorder::default();

        let err = FlowWalker::new(5)
            .walk(&source, "A", &mut recorder)
            .await
            .unwrap_err();

        match err {
            AdapterError::DepthExceeded { id, max_depth } => {
                assert_eq!(id, "A");
                assert_eq!(max_depth, 5);
            }
            other => panic!("expected DepthExceeded, got {:?}", other),
        }
        // Depths 0 through 5 were visited before the guard tripped.
        assert_eq!(recorder.visits.len(), 6);
    }

    #[tokio::test]
    async fn test_tree_at_depth_limit_succeeds() {
        let source = MapSource::new(&[("root", &["a"]), ("a", &["b"]), ("b", &[])]);
        let mut recorder = Recorder::default();

        let stats = FlowWalker::new(2)
            .walk(&source, "root", &mut recorder)
            .await
            .unwrap();
        assert_eq!(stats.max_depth_reached, 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_walk() {
        let source = MapSource::new(&[("root", &["a", "missing", "b"]), ("a", &[]), ("b", &[])]);
        let mut recorder = Recorder::default();

        let err = FlowWalker::default()
            .walk(&source, "root", &mut recorder)
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(404));
        let order: Vec<&str> = recorder.visits.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(order, vec!["root", "a"]);
    }

    #[tokio::test]
    async fn test_visitor_failure_aborts_walk() {
        let source = three_level_tree();
        let mut recorder = Recorder {
            fail_on: Some("b".to_string()),
            ..Default::default()
        };

        let result = FlowWalker::default()
            .walk(&source, "root", &mut recorder)
            .await;

        assert!(result.is_err());
        assert_eq!(recorder.visits.len(), 4);
        assert!(!source.fetched.lock().contains(&"c".to_string()));
    }

    #[test]
    fn test_payload_as() {
        #[derive(serde::Deserialize)]
        struct Payload {
            id: String,
        }

        let node = FlowNode {
            id: "g1".to_string(),
            children: Vec::new(),
            payload: json!({ "id": "g1" }),
        };
        let payload: Payload = node.payload_as().unwrap();
        assert_eq!(payload.id, "g1");

        let err = node.payload_as::<Vec<String>>().unwrap_err();
        assert!(matches!(err, AdapterError::Decode { .. }));
    }
}
