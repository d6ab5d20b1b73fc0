use serde::{Deserialize, Serialize};

/// Enumerated connection channels (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Main,
    AiTool,
    AiAgent,
    AiMemory,
    AiOutputParser,
    AiLanguageModel,
    AiDocument,
    AiEmbedding,
    AiRetriever,
    AiTextSplitter,
    AiVectorStore,
}

impl Default for Channel {
    fn default() -> Self {
        Channel::Main
    }
}

/// One side of a connection, named (as the Engine's wire format keys
/// connections by node name) rather than arena-indexed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionEndpoint {
    pub node: String,
    #[serde(default, rename = "type")]
    pub channel: Channel,
    #[serde(default)]
    pub index: u32,
}

/// A directed edge between two nodes, resolved to arena indices.
///
/// Per the arena-of-nodes-with-stable-indices strategy (spec §9,
/// "cyclic graphs"), a [`super::Workflow`]'s connections are resolved
/// against its `nodes: Vec<Node>` once at construction time, so
/// traversal never needs to re-hash node names and tolerates cycles
/// and multi-output fan-out without special-casing. The name-keyed
/// form remains the wire format; `Connection` is the internal,
/// index-resolved counterpart produced when a workflow is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connection {
    pub src_idx: usize,
    pub src_channel_index: ChannelKey,
    pub dst_idx: usize,
    pub dst_channel: ChannelKey,
    pub dst_index: u32,
}

/// Hashable stand-in for `(Channel, output index)`, used as the key
/// into a workflow's arena connection map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelKey {
    pub channel: ChannelDiscriminant,
    pub index: u32,
}

/// `Channel` without payload, purely for hashing — `Channel` itself
/// doesn't need `Hash` outside this module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelDiscriminant {
    Main,
    AiTool,
    AiAgent,
    AiMemory,
    AiOutputParser,
    AiLanguageModel,
    AiDocument,
    AiEmbedding,
    AiRetriever,
    AiTextSplitter,
    AiVectorStore,
}

impl From<Channel> for ChannelDiscriminant {
    fn from(channel: Channel) -> Self {
        match channel {
            Channel::Main => ChannelDiscriminant::Main,
            Channel::AiTool => ChannelDiscriminant::AiTool,
            Channel::AiAgent => ChannelDiscriminant::AiAgent,
            Channel::AiMemory => ChannelDiscriminant::AiMemory,
            Channel::AiOutputParser => ChannelDiscriminant::AiOutputParser,
            Channel::AiLanguageModel => ChannelDiscriminant::AiLanguageModel,
            Channel::AiDocument => ChannelDiscriminant::AiDocument,
            Channel::AiEmbedding => ChannelDiscriminant::AiEmbedding,
            Channel::AiRetriever => ChannelDiscriminant::AiRetriever,
            Channel::AiTextSplitter => ChannelDiscriminant::AiTextSplitter,
            Channel::AiVectorStore => ChannelDiscriminant::AiVectorStore,
        }
    }
}
