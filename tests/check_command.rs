#![allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
//! Integration tests for the `check` command.

mod common;

use common::{Workspace, WorkspaceBuilder};
use hansel_cli::checker::Checker;
use hansel_cli::cli::GlobalOpts;
use hansel_cli::commands::check;
use hansel_cli::config::Mode;
use hansel_cli::logging::Logger;
use hansel_cli::manifest;
use hansel_cli::operations::SystemFileSystemOps;

fn run(workspace: &Workspace) -> bool {
    let settings = workspace.settings(Mode::Check, "app.hbc", "win64d", &GlobalOpts::default());
    check::run_with(&settings, &SystemFileSystemOps, &Logger::new(false)).unwrap()
}

/// `app` needs Zlib 1.2.0 directly and Zlib 1.3.0 through `Core`.
fn zlib_workspace(core_name: &str, core_version: &str) -> Workspace {
    WorkspaceBuilder::new()
        .with_breadcrumb(
            "app.hbc",
            r#"<Dependencies LibraryPath="libs">
                 <Library Name="Zlib" Version="1.2.0" Destination="$(OUTPUT_DIR)/libs"/>
                 <Project Name="Core" Destination="$(OUTPUT_DIR)"/>
               </Dependencies>"#,
        )
        .with_breadcrumb(
            "Core/Core.hbc",
            &format!(
                r#"<Dependencies LibraryPath="../libs">
                     <Library Name="{core_name}" Version="{core_version}" Destination="$(OUTPUT_DIR)/libs"/>
                   </Dependencies>"#
            ),
        )
        .with_breadcrumb("libs/Zlib/1.2.0/Zlib.hbc", "<Dependencies/>")
        .with_breadcrumb("libs/Zlib/1.3.0/Zlib.hbc", "<Dependencies/>")
        .with_breadcrumb("libs/ZLIB/1.2.0/ZLIB.hbc", "<Dependencies/>")
        .build()
}

#[test]
fn minor_version_conflict_keeps_higher_version() {
    let workspace = zlib_workspace("Zlib", "1.3.0");
    assert!(!run(&workspace));

    let settings = workspace.settings(Mode::Check, "app.hbc", "win64d", &GlobalOpts::default());
    let log = Logger::new(false);
    let root = manifest::parse_root(&settings, &SystemFileSystemOps, &log).unwrap();
    let mut checker = Checker::new(&SystemFileSystemOps, &log);
    assert!(!checker.check_root(&root));
    assert_eq!(checker.library_version("zlib").unwrap().to_string(), "1.3.0");
}

#[test]
fn library_names_compare_case_insensitively() {
    let workspace = zlib_workspace("ZLIB", "1.2.0");
    assert!(run(&workspace));
}

#[test]
fn empty_tree_passes() {
    let workspace = WorkspaceBuilder::new()
        .with_breadcrumb("app.hbc", "<Dependencies/>")
        .build();
    assert!(run(&workspace));
}

#[test]
fn overwriting_a_file_from_another_source_conflicts() {
    let workspace = WorkspaceBuilder::new()
        .with_breadcrumb(
            "app.hbc",
            r#"<Dependencies>
                 <File Path="a/config.ini" Destination="$(OUTPUT_DIR)/etc"/>
                 <Directory Path="b" Destination="$(OUTPUT_DIR)"/>
               </Dependencies>"#,
        )
        .with_file("a/config.ini", "a")
        .with_file("b/etc/config.ini", "b")
        .build();
    assert!(!run(&workspace));
}

#[test]
fn copying_the_same_file_twice_is_fine() {
    let workspace = WorkspaceBuilder::new()
        .with_breadcrumb(
            "app.hbc",
            r#"<Dependencies>
                 <File Path="a/config.ini" Destination="$(OUTPUT_DIR)/etc"/>
                 <Files Path="a/*.ini" Destination="$(OUTPUT_DIR)/etc"/>
               </Dependencies>"#,
        )
        .with_file("a/config.ini", "a")
        .build();
    assert!(run(&workspace));
}
