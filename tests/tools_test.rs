mod common;

use assert2::{check, let_assert};
use common::{IsolatedDocs, isolated_docs, isolated_docs_without_metadata};
use doxsearch::tools::{
    FindRequest, FullTextSearchRequest, ListSectionsRequest, LookupRequest, SearchRequest,
    SetDocsRootRequest, ValidateIndexRequest, handle_find, handle_full_text_search,
    handle_list_sections, handle_lookup, handle_search, handle_set_docs_root,
    handle_validate_index,
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn set_docs_root_detects_search_folder(isolated_docs: IsolatedDocs) {
    let request = SetDocsRootRequest {
        path: isolated_docs.root().display().to_string(),
    };
    let result = handle_set_docs_root(&isolated_docs.state, request).await;
    let_assert!(Ok(output) = result);
    check!(output.contains("Documentation root set"));
    check!(output.contains("Loaded 18 entries from 1 data files"));
    check!(output.contains("Sections: all"));

    let root = isolated_docs.state.docs_root().await.unwrap();
    check!(root.ends_with("html/search"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn set_docs_root_rejects_plain_directory(isolated_docs: IsolatedDocs) {
    isolated_docs.workspace.create_dir("empty");
    let request = SetDocsRootRequest {
        path: isolated_docs.root().join("empty").display().to_string(),
    };
    let_assert!(Err(msg) = handle_set_docs_root(&isolated_docs.state, request).await);
    check!(msg.contains("No Doxygen search index"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tools_require_docs_root(isolated_docs: IsolatedDocs) {
    let request = LookupRequest {
        token: "average_17".to_string(),
    };
    let_assert!(Err(msg) = handle_lookup(&isolated_docs.state, request).await);
    check!(msg.contains("set_docs_root"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn lookup_lists_every_overload(isolated_docs: IsolatedDocs) {
    isolated_docs.select().await;
    let request = LookupRequest {
        token: "aggregate_5facross_5fcells_2".to_string(),
    };
    let output = handle_lookup(&isolated_docs.state, request).await.unwrap();

    check!(output.contains("`aggregate_across_cells`"));
    check!(output.contains("#a76e8390729e70654df46d322d2e119ff"));
    check!(output.contains("#a8e46dd59466d786b30ad2534055b0b11"));
    // Scopes are shown with entities decoded
    check!(output.contains("const tatami::Matrix< Data_, Index_ > &input"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn lookup_miss_suggests_close_tokens(isolated_docs: IsolatedDocs) {
    isolated_docs.select().await;
    let request = LookupRequest {
        token: "aggregate_5facross_5fcels_2".to_string(),
    };
    let output = handle_lookup(&isolated_docs.state, request).await.unwrap();
    check!(output.contains("not found"));
    check!(output.contains("Did you mean"));
    check!(output.contains("aggregate_5facross_5fcells_2"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn lookup_of_plain_name_explains_encoding(isolated_docs: IsolatedDocs) {
    isolated_docs.select().await;
    let request = LookupRequest {
        token: "aggregate across cells".to_string(),
    };
    let output = handle_lookup(&isolated_docs.state, request).await.unwrap();
    check!(output.contains("`aggregate_20across_20cells_0`"));
}

#[rstest]
#[case::with_metadata(IsolatedDocs::new(true))]
#[case::without_metadata(IsolatedDocs::new(false))]
#[tokio::test(flavor = "multi_thread")]
async fn search_uses_widget_prefix_semantics(#[case] docs: IsolatedDocs) {
    docs.select().await;
    let request = SearchRequest {
        query: "Aggregate_Across".to_string(),
        section: None,
        limit: Some(2),
    };
    let output = handle_search(&docs.state, request).await.unwrap();

    check!(output.contains("(4 total)"));
    check!(output.contains("1. `aggregate_across_cells`"));
    check!(output.contains("2. `aggregate_across_cells.hpp`"));
    check!(!output.contains("aggregate_across_genes"));
    check!(output.contains("2 more"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn search_rejects_unknown_section(isolated_docs: IsolatedDocs) {
    isolated_docs.select().await;
    let request = SearchRequest {
        query: "array".to_string(),
        section: Some("classes".to_string()),
        limit: None,
    };
    let_assert!(Err(msg) = handle_search(&isolated_docs.state, request).await);
    check!(msg.contains("Available sections: all"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn search_miss_gives_tips(isolated_docs: IsolatedDocs) {
    isolated_docs.select().await;
    let request = SearchRequest {
        query: "cells".to_string(),
        section: None,
        limit: None,
    };
    let output = handle_search(&isolated_docs.state, request).await.unwrap();
    check!(output.contains("No results found for 'cells'"));
    check!(output.contains("Search tips"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn find_matches_anywhere(isolated_docs: IsolatedDocs) {
    isolated_docs.select().await;
    let request = FindRequest {
        text: "Options".to_string(),
        limit: None,
    };
    let output = handle_find(&isolated_docs.state, request).await.unwrap();
    check!(output.contains("AggregateAcrossCellsOptions"));
    check!(output.contains("AggregateAcrossGenesOptions"));
    check!(!output.contains("ArrayView"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_text_search_ranks_by_relevance(isolated_docs: IsolatedDocs) {
    isolated_docs.select().await;
    let request = FullTextSearchRequest {
        query: "averaging".to_string(),
        limit: Some(3),
    };
    let output = handle_full_text_search(&isolated_docs.state, request).await.unwrap();
    check!(output.contains("1. `average`"));
    check!(output.contains("relevance: 100%"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn list_sections_reports_counts(isolated_docs: IsolatedDocs) {
    isolated_docs.select().await;
    let output = handle_list_sections(&isolated_docs.state, ListSectionsRequest {})
        .await
        .unwrap();
    check!(output.contains("• All (`all`): 18 entries in 1 files"));
    check!(output.contains("leading characters: a"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn list_sections_without_metadata(isolated_docs_without_metadata: IsolatedDocs) {
    isolated_docs_without_metadata.select().await;
    let output = handle_list_sections(&isolated_docs_without_metadata.state, ListSectionsRequest {})
        .await
        .unwrap();
    check!(output.contains("• all (`all`): 18 entries in 1 files"));
    check!(output.contains("inferred from file names"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn validate_index_reports_clean_sample(isolated_docs: IsolatedDocs) {
    isolated_docs.select().await;
    let output = handle_validate_index(&isolated_docs.state, ValidateIndexRequest {})
        .await
        .unwrap();
    check!(output.contains("Validated 1 data files: 0 errors, 0 warnings"));
    check!(output.contains("✓ all_0.js: 18 entries, 23 targets"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn validate_index_lists_problems(isolated_docs: IsolatedDocs) {
    isolated_docs.workspace.create_file(
        "html/search/all_1.js",
        "var searchData=\n[\n  ['bias_3',['',['not a url',1,'']]]\n];\n",
    );
    isolated_docs.select().await;
    let output = handle_validate_index(&isolated_docs.state, ValidateIndexRequest {})
        .await
        .unwrap();
    check!(output.contains("✗ all_1.js"));
    check!(output.contains("error: entry 'bias_3' has an empty label"));
    check!(output.contains("malformed anchor 'not a url'"));
    check!(output.contains("warning: token 'bias_3' has serial 3 where 0 was expected"));
}
