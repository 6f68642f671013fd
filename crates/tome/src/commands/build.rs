//! The `build` command: run the full pipeline and write the site.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;

use tome_aggregate::{aggregate, TermProgress};
use tome_catalog::{classify_into, ContentCatalog, Family, FilePub};
use tome_composer::{LayoutRenderer, PageComposer, UiCatalog};
use tome_markup::CatalogHooks;
use tome_nav::build_navigation;
use tome_playbook::{CliSettings, Playbook};

use crate::error::CliError;
use crate::output::Output;
use crate::template::{builtin_layouts, render_body, BasicLayout};

/// Arguments of the `build` command.
#[derive(Debug, Args)]
pub(crate) struct BuildArgs {
    /// Path to the playbook file (default: discover tome.toml).
    #[arg(long, value_name = "FILE")]
    playbook: Option<PathBuf>,

    /// Directory the site is generated into, relative to the playbook dir.
    #[arg(long, value_name = "DIR", default_value = "build/site")]
    to_dir: PathBuf,

    /// Fetch updates for cached remote repositories.
    #[arg(long)]
    pull: bool,

    /// Suppress the fetch progress display.
    #[arg(long)]
    quiet: bool,

    /// Suppress all terminal output.
    #[arg(long)]
    pub(crate) silent: bool,

    /// Enable info-level logging.
    #[arg(long, short)]
    pub(crate) verbose: bool,
}

impl BuildArgs {
    /// Run the build.
    pub(crate) fn execute(&self, output: &Output) -> Result<(), CliError> {
        let settings = CliSettings {
            pull: self.pull.then_some(true),
            quiet: self.quiet.then_some(true),
            silent: self.silent.then_some(true),
            ..Default::default()
        };
        let playbook = Playbook::load(self.playbook.as_deref(), Some(&settings))?;

        output.highlight(&format!(
            "Aggregating {} content source(s)",
            playbook.content.sources.len()
        ));
        let bundles = {
            let progress = TermProgress::for_runtime(&playbook.runtime);
            aggregate(&playbook, progress.as_ref())?
        };

        let mut catalog = ContentCatalog::new(playbook.urls.html_extension_style);
        for bundle in bundles {
            output.info(&format!("  {} {}", bundle.name, bundle.version));
            classify_into(&mut catalog, bundle)?;
        }
        if let Some(spec) = &playbook.site.start_page {
            catalog.register_site_start_page(spec)?;
        }

        let hooks = CatalogHooks::new(&catalog, false);
        let nav = build_navigation(&catalog, &hooks);

        let ui = UiCatalog::new(
            playbook.ui.output_dir.clone(),
            playbook
                .ui
                .default_layout
                .clone()
                .unwrap_or_else(|| "default".to_owned()),
            builtin_layouts(),
        );
        let composer = PageComposer::new(&playbook, &catalog, &nav, ui);
        let layout_engine = BasicLayout;

        let site_dir = resolve_dir(&playbook.dir, &self.to_dir);
        let mut pages = 0usize;
        let mut assets = 0usize;

        for file in catalog.files() {
            if file.publish.is_none() {
                continue;
            }
            match file.src.family {
                Family::Page => {
                    let model = composer.compose(&file)?;
                    let source = String::from_utf8_lossy(&file.contents);
                    let body = render_body(&source, &file, &hooks);
                    let bytes =
                        layout_engine.render(&model.layout, composer.site(), &model, &body);
                    let out = file.out.as_ref().expect("publishable pages carry out");
                    write_site_file(&site_dir, &out.path, &bytes)?;
                    pages += 1;
                }
                Family::Image | Family::Attachment => {
                    let out = file.out.as_ref().expect("publishable assets carry out");
                    write_site_file(&site_dir, &out.path, &file.contents)?;
                    assets += 1;
                }
                Family::Alias => {
                    if let (Some(publish), Some(target)) = (&file.publish, &file.rel) {
                        if let Some(target_url) = target.url() {
                            let bytes = redirect_page(target_url);
                            write_site_file(&site_dir, &alias_output_path(publish), &bytes)?;
                        }
                    }
                }
                _ => {}
            }
        }

        let manifest = serde_json::to_vec_pretty(composer.site())?;
        write_site_file(&site_dir, "site.json", &manifest)?;

        output.success(&format!(
            "Site generated into {} ({pages} pages, {assets} assets)",
            site_dir.display()
        ));
        Ok(())
    }
}

fn resolve_dir(base: &Path, dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        base.join(dir)
    }
}

/// Output path of an alias redirect page, derived from its publish URL.
fn alias_output_path(publish: &FilePub) -> String {
    let trimmed = publish.url.trim_start_matches('/');
    if trimmed.ends_with('/') {
        format!("{trimmed}index.html")
    } else if trimmed.rsplit('/').next().is_some_and(|name| name.contains('.')) {
        trimmed.to_owned()
    } else {
        format!("{trimmed}.html")
    }
}

/// Minimal meta-refresh redirect document.
fn redirect_page(target_url: &str) -> Vec<u8> {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<link rel=\"canonical\" href=\"{target_url}\">\n<meta http-equiv=\"refresh\" content=\"0; url={target_url}\">\n</head>\n<body>\n<p>This page has moved to <a href=\"{target_url}\">{target_url}</a>.</p>\n</body>\n</html>\n"
    )
    .into_bytes()
}

fn write_site_file(site_dir: &Path, path: &str, contents: &[u8]) -> Result<(), CliError> {
    let file_path = site_dir.join(path);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, contents)?;
    tracing::debug!(path = %path, "Wrote site file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use git2::{Repository, Signature};

    use super::*;

    fn init_fixture_repo(dir: &Path) {
        let repo = Repository::init(dir).unwrap();
        let files = [
            (
                "tome.yml",
                "name: docs\nversion: '1.0'\ntitle: The Docs\nnav:\n- modules/ROOT/nav.adoc\n",
            ),
            ("modules/ROOT/pages/index.adoc", "= Home\n\nWelcome.\n"),
            (
                "modules/ROOT/pages/guide.adoc",
                "= Guide\n\nSee xref:index.adoc[Home].\n",
            ),
            ("modules/ROOT/nav.adoc", "* xref:index.adoc[Home]\n** xref:guide.adoc[Guide]\n"),
            ("modules/ROOT/assets/images/logo.png", "not really a png"),
        ];
        for (path, contents) in files {
            let full = dir.join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, contents).unwrap();
        }
        let sig = Signature::now("test", "test@example.org").unwrap();
        let tree_id = {
            let mut index = repo.index().unwrap();
            index
                .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
                .unwrap();
            index.write().unwrap();
            index.write_tree().unwrap()
        };
        let tree = repo.find_tree(tree_id).unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
            .unwrap();
    }

    #[test]
    fn test_build_writes_site() {
        let dir = tempfile::tempdir().unwrap();
        init_fixture_repo(&dir.path().join("repo"));
        fs::write(
            dir.path().join("tome.toml"),
            "[site]\ntitle = \"Docs\"\nstart_page = \"docs::index.adoc\"\n\n[[content.sources]]\nurl = \"./repo\"\n",
        )
        .unwrap();

        let args = BuildArgs {
            playbook: Some(dir.path().join("tome.toml")),
            to_dir: PathBuf::from("build/site"),
            pull: false,
            quiet: true,
            silent: true,
            verbose: false,
        };
        args.execute(&Output::new(true)).unwrap();

        let site = dir.path().join("build/site");
        let index = fs::read_to_string(site.join("docs/1.0/index.html")).unwrap();
        assert!(index.contains("<h1>Home</h1>"));
        assert!(index.contains("Welcome."));

        let guide = fs::read_to_string(site.join("docs/1.0/guide.html")).unwrap();
        // Navigation and body cross-references resolve to publish URLs.
        assert!(guide.contains("href=\"/docs/1.0/index.html\""));

        assert!(site.join("docs/1.0/_images/logo.png").exists());
        assert!(site.join("site.json").exists());
    }

    #[test]
    fn test_alias_output_path_shapes() {
        let publish = |url: &str| FilePub {
            url: url.to_owned(),
            module_root_path: None,
            root_path: None,
            canonical_url: None,
        };
        assert_eq!(alias_output_path(&publish("/docs/old.html")), "docs/old.html");
        assert_eq!(alias_output_path(&publish("/docs/old/")), "docs/old/index.html");
        assert_eq!(alias_output_path(&publish("/docs/old")), "docs/old.html");
    }
}
