mod common;

use assert2::{check, let_assert};
use common::{IsolatedDocs, isolated_docs, sample_all_0, test_config};
use doxsearch::{LoadError, SearchEntry, UnknownSection};
use doxsearch::cli::{Commands, execute};
use rstest::rstest;
use std::path::PathBuf;

#[rstest]
fn lookup_prints_entry(isolated_docs: IsolatedDocs) {
    let config = test_config(isolated_docs.root());
    let command = Commands::Lookup {
        dir: isolated_docs.root().to_path_buf(),
        token: "arrayview_15".to_string(),
    };
    let outcome = execute(&command, &config).unwrap();
    check!(outcome.success);
    check!(outcome.output.contains("`ArrayView`"));
    check!(outcome.output.contains("tatami::ArrayView< typename T >"));
}

#[rstest]
fn lookup_miss_fails(isolated_docs: IsolatedDocs) {
    let config = test_config(isolated_docs.root());
    let command = Commands::Lookup {
        dir: isolated_docs.root().to_path_buf(),
        token: "arrayview_16".to_string(),
    };
    let outcome = execute(&command, &config).unwrap();
    check!(!outcome.success);
}

#[rstest]
fn search_json_lists_entries(isolated_docs: IsolatedDocs) {
    let config = test_config(isolated_docs.root());
    let command = Commands::Search {
        dir: isolated_docs.search_dir(),
        query: "arith".to_string(),
        section: None,
        limit: None,
        json: true,
    };
    let outcome = execute(&command, &config).unwrap();
    let entries: Vec<SearchEntry> = serde_json::from_str(&outcome.output).unwrap();
    let tokens: Vec<_> = entries.iter().map(|e| e.token.as_str()).collect();
    check!(
        tokens
            == vec![
                "arithmetic_5fhelpers_2ehpp_12",
                "arithmetic_5futils_2ehpp_13",
                "arithmeticoperation_14",
            ]
    );
    check!(entries[0].targets[0].flag == 1);
}

#[rstest]
fn find_honours_limit(isolated_docs: IsolatedDocs) {
    let config = test_config(isolated_docs.root());
    let command = Commands::Find {
        dir: isolated_docs.root().to_path_buf(),
        text: "aggregate".to_string(),
        limit: Some(1),
    };
    let outcome = execute(&command, &config).unwrap();
    check!(outcome.output.contains("1. `Aggregate expression values across cells`"));
    check!(!outcome.output.contains("2. "));
}

#[rstest]
fn check_passes_on_sample_and_fails_on_errors(isolated_docs: IsolatedDocs) {
    let config = test_config(isolated_docs.root());
    let command = Commands::Check {
        dir: isolated_docs.root().to_path_buf(),
    };
    check!(execute(&command, &config).unwrap().success);

    isolated_docs.workspace.create_file(
        "html/search/all_1.js",
        "var searchData=\n[\n  ['b_0',['b',['javascript:void(0)',1,'']]]\n];\n",
    );
    let outcome = execute(&command, &config).unwrap();
    check!(!outcome.success);
    check!(outcome.output.contains("1 errors"));
}

#[rstest]
fn format_keeps_sample_byte_identical(isolated_docs: IsolatedDocs) {
    let config = test_config(isolated_docs.root());
    let file = isolated_docs.search_dir().join("all_0.js");

    let outcome = execute(&Commands::Format { file: file.clone(), check: true }, &config).unwrap();
    check!(outcome.success);
    check!(outcome.output.contains("is canonical"));

    let outcome = execute(&Commands::Format { file, check: false }, &config).unwrap();
    check!(outcome.success);
    check!(isolated_docs.workspace.read_file("html/search/all_0.js") == sample_all_0());
}

#[rstest]
fn missing_directory_is_an_error(isolated_docs: IsolatedDocs) {
    let config = test_config(isolated_docs.root());
    let command = Commands::Check {
        dir: isolated_docs.root().join("nowhere"),
    };
    let_assert!(Err(err) = execute(&command, &config));
    check!(err.to_string().contains("no Doxygen search index"));
}

#[rstest]
#[case::check(|dir| Commands::Check { dir })]
#[case::lookup(|dir| Commands::Lookup { dir, token: "average_17".to_string() })]
fn empty_subdirectory_does_not_use_parent_index(
    isolated_docs: IsolatedDocs,
    #[case] command: fn(PathBuf) -> Commands,
) {
    isolated_docs.workspace.create_dir("empty");
    let config = test_config(isolated_docs.root());

    let_assert!(Err(err) = execute(&command(isolated_docs.root().join("empty")), &config));
    let_assert!(Some(LoadError::NotFound { path }) = err.downcast_ref::<LoadError>());
    check!(path.ends_with("empty"));
}

#[rstest]
fn search_rejects_unknown_section(isolated_docs: IsolatedDocs) {
    let config = test_config(isolated_docs.root());
    let command = Commands::Search {
        dir: isolated_docs.root().to_path_buf(),
        query: "aggregate".to_string(),
        section: Some("bogus".to_string()),
        limit: None,
        json: false,
    };
    let_assert!(Err(err) = execute(&command, &config));
    let_assert!(Some(unknown) = err.downcast_ref::<UnknownSection>());
    check!(unknown.name == "bogus");
    check!(err.to_string().contains("Available sections: all"));
}
