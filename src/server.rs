//! MCP server exposing the search index tools over stdio.

use crate::config::Config;
use crate::tools::{
    FindRequest, FullTextSearchRequest, ListSectionsRequest, LookupRequest, SearchRequest,
    SetDocsRootRequest, ValidateIndexRequest, handle_find, handle_full_text_search,
    handle_list_sections, handle_lookup, handle_search, handle_set_docs_root,
    handle_validate_index,
};
use crate::worker::DocState;
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars::{self, JsonSchema, generate::SchemaSettings},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

/// MCP Server for Doxygen search index queries
#[derive(Clone)]
pub struct IndexServer {
    /// Shared site state (LRU, in-flight loads, docs root)
    state: Arc<DocState>,

    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for IndexServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexServer")
            .field("state", &self.state)
            .finish()
    }
}

#[tool_router]
impl IndexServer {
    pub fn new(config: Config) -> Self {
        Self::with_state(Arc::new(DocState::new(config)))
    }

    pub fn with_state(state: Arc<DocState>) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    /// Get a reference to the shared DocState.
    pub fn doc_state(&self) -> &Arc<DocState> {
        &self.state
    }

    #[tool(
        description = "Select the Doxygen documentation to query. Accepts the project directory, the HTML output directory, or its search/ folder, and loads every search data file found there.",
        input_schema = inline_schema_for_type::<SetDocsRootRequest>()
    )]
    async fn set_docs_root(
        &self,
        Parameters(request): Parameters<SetDocsRootRequest>,
    ) -> std::result::Result<String, String> {
        handle_set_docs_root(&self.state, request).await
    }

    #[tool(
        description = "Look up an exact search token such as 'aggregate_5facross_5fcells_2' and list its label and every documented target. Suggests close tokens when there is no match.",
        input_schema = inline_schema_for_type::<LookupRequest>()
    )]
    async fn lookup(
        &self,
        Parameters(request): Parameters<LookupRequest>,
    ) -> std::result::Result<String, String> {
        handle_lookup(&self.state, request).await
    }

    #[tool(
        description = "Search the index the way the documentation's search box does: the query is encoded like a token and matched as a prefix, in index order. Optionally restrict to a section such as 'classes' or 'functions'.",
        input_schema = inline_schema_for_type::<SearchRequest>()
    )]
    async fn search(
        &self,
        Parameters(request): Parameters<SearchRequest>,
    ) -> std::result::Result<String, String> {
        handle_search(&self.state, request).await
    }

    #[tool(
        description = "Find entries whose label or name contains the given text anywhere, case-insensitively. Exact and prefix matches rank first.",
        input_schema = inline_schema_for_type::<FindRequest>()
    )]
    async fn find(
        &self,
        Parameters(request): Parameters<FindRequest>,
    ) -> std::result::Result<String, String> {
        handle_find(&self.state, request).await
    }

    #[tool(
        description = "Ranked TF-IDF search over entry labels and target signatures with English stemming. Use for questions like 'which functions take a matrix'.",
        input_schema = inline_schema_for_type::<FullTextSearchRequest>()
    )]
    async fn full_text_search(
        &self,
        Parameters(request): Parameters<FullTextSearchRequest>,
    ) -> std::result::Result<String, String> {
        handle_full_text_search(&self.state, request).await
    }

    #[tool(
        description = "List the search sections (all, classes, files, functions, ...) with their entry counts.",
        input_schema = inline_schema_for_type::<ListSectionsRequest>()
    )]
    async fn list_sections(
        &self,
        Parameters(request): Parameters<ListSectionsRequest>,
    ) -> std::result::Result<String, String> {
        handle_list_sections(&self.state, request).await
    }

    #[tool(
        description = "Check every search data file for malformed tokens, empty labels, malformed anchors, tokens that do not match their label, and out-of-order serials.",
        input_schema = inline_schema_for_type::<ValidateIndexRequest>()
    )]
    async fn validate_index(
        &self,
        Parameters(request): Parameters<ValidateIndexRequest>,
    ) -> std::result::Result<String, String> {
        handle_validate_index(&self.state, request).await
    }
}

#[tool_handler]
impl ServerHandler for IndexServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(
                "doxsearch: query Doxygen-generated documentation through its search index. \
                 Detects html/search or docs/search below the working directory on startup. \
                 Use set_docs_root to point at other documentation.",
            )
    }
}

/// Generate an inline JSON schema for MCP tools
///
/// Unlike rmcp's default `schema_for_type()`, this sets `inline_subschemas = true`
/// so nested types are inlined instead of emitted as `$ref` patterns.
pub fn inline_schema_for_type<T: JsonSchema>() -> Arc<JsonObject> {
    let mut settings = SchemaSettings::draft07();
    settings.transforms = vec![Box::new(schemars::transform::AddNullable::default())];
    settings.inline_subschemas = true;

    let generator = settings.into_generator();
    let schema = generator.into_root_schema_for::<T>();
    let object = serde_json::to_value(schema).expect("failed to serialize schema");

    let json_object = match object {
        serde_json::Value::Object(object) => object,
        _ => panic!("Schema serialization produced non-object value"),
    };

    Arc::new(json_object)
}
