use crate::common::{ActionIdx, State};

pub(crate) type NodeId = usize;

#[derive(Debug, Clone)]
pub(crate) struct SearchNode {
    pub(crate) state: State,
    pub(crate) parent: Option<NodeId>,
    pub(crate) action: Option<ActionIdx>,
    pub(crate) g_cost: usize,
}

/// Every node generated by one search run. Parents are addressed by id.
#[derive(Debug, Default)]
pub(crate) struct NodeArena {
    nodes: Vec<SearchNode>,
}

impl NodeArena {
    pub(crate) fn root(&mut self, state: State) -> NodeId {
        self.nodes.push(SearchNode {
            state,
            parent: None,
            action: None,
            g_cost: 0,
        });
        self.nodes.len() - 1
    }

    pub(crate) fn child(&mut self, parent: NodeId, action: ActionIdx, state: State) -> NodeId {
        let g_cost = self.nodes[parent].g_cost + 1;
        self.nodes.push(SearchNode {
            state,
            parent: Some(parent),
            action: Some(action),
            g_cost,
        });
        self.nodes.len() - 1
    }

    pub(crate) fn get(&self, node: NodeId) -> &SearchNode {
        &self.nodes[node]
    }

    /// Actions on the path from the root to `node`.
    pub(crate) fn extract_plan(&self, mut node: NodeId) -> Vec<ActionIdx> {
        let mut plan = Vec::new();
        while let SearchNode {
            parent: Some(parent),
            action: Some(action),
            ..
        } = self.nodes[node]
        {
            plan.push(action);
            node = parent;
        }
        plan.reverse();
        plan
    }
}

/// Open-list entry. Orders by key, then by generation so that ties are
/// resolved first-in first-out.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct OpenNode<K> {
    pub(crate) key: K,
    pub(crate) generation: usize,
    pub(crate) node: NodeId,
}
