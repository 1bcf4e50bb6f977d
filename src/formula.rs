//! Homebrew formula parsing and patching
//!
//! The formula is held as its original lines plus a structural index of
//! source blocks: the main `url`/`sha256` pair at class level, and each
//! `resource "name" do … end` block with its own pair. Patching rewrites
//! only the two lines of the addressed block and leaves every other line
//! byte-identical, so a formula carrying several resources keeps a distinct
//! hash per resource.

use crate::core::error::{FormulaError, SlipwayError, SlipwayResult, ResultExt};
use std::fs;
use std::path::{Path, PathBuf};

/// One url + sha256 pair inside the formula
#[derive(Debug, Clone)]
pub struct SourceBlock {
  url_line: usize,
  sha_line: usize,
  pub url: String,
  pub sha256: String,
}

/// A parsed formula file
#[derive(Debug)]
pub struct Formula {
  path: PathBuf,
  lines: Vec<String>,
  trailing_newline: bool,
  main: SourceBlock,
  resources: Vec<(String, SourceBlock)>,
}

impl Formula {
  /// Load and parse a formula file
  pub fn load(path: &Path) -> SlipwayResult<Self> {
    if !path.exists() {
      return Err(SlipwayError::Formula(FormulaError::NotFound {
        path: path.to_path_buf(),
      }));
    }

    let content =
      fs::read_to_string(path).with_context(|| format!("Failed to read formula {}", path.display()))?;

    Self::parse(path, &content)
  }

  fn parse(path: &Path, content: &str) -> SlipwayResult<Self> {
    let trailing_newline = content.ends_with('\n');
    let lines: Vec<String> = content.lines().map(str::to_string).collect();

    let mut depth = 0usize;
    let mut main_url: Option<(usize, String)> = None;
    let mut main_sha: Option<(usize, String)> = None;
    let mut resources: Vec<(String, SourceBlock)> = Vec::new();

    // (name, url, sha) of the resource block currently open at depth 2
    let mut open_resource: Option<(String, Option<(usize, String)>, Option<(usize, String)>)> = None;

    for (idx, line) in lines.iter().enumerate() {
      let trimmed = line.trim();

      if let Some(name) = resource_name(trimmed) {
        if depth == 1 {
          open_resource = Some((name, None, None));
        }
        depth += 1;
        continue;
      }

      if opens_block(trimmed) {
        depth += 1;
        continue;
      }

      if trimmed == "end" {
        depth = depth.saturating_sub(1);
        if depth == 1
          && let Some((name, url, sha)) = open_resource.take()
        {
          let (url_line, url_value) = url.ok_or_else(|| missing_field(path, "url"))?;
          let (sha_line, sha_value) = sha.ok_or_else(|| missing_field(path, "sha256"))?;
          resources.push((
            name,
            SourceBlock {
              url_line,
              sha_line,
              url: url_value,
              sha256: sha_value,
            },
          ));
        }
        continue;
      }

      if let Some(value) = quoted_value(trimmed, "url") {
        match (depth, &mut open_resource) {
          (2, Some((_, url, _))) => *url = Some((idx, value)),
          (1, _) if main_url.is_none() => main_url = Some((idx, value)),
          _ => {}
        }
      } else if let Some(value) = quoted_value(trimmed, "sha256") {
        match (depth, &mut open_resource) {
          (2, Some((_, _, sha))) => *sha = Some((idx, value)),
          (1, _) if main_sha.is_none() => main_sha = Some((idx, value)),
          _ => {}
        }
      }
    }

    let (url_line, url) = main_url.ok_or_else(|| missing_field(path, "url"))?;
    let (sha_line, sha256) = main_sha.ok_or_else(|| missing_field(path, "sha256"))?;

    Ok(Self {
      path: path.to_path_buf(),
      lines,
      trailing_newline,
      main: SourceBlock {
        url_line,
        sha_line,
        url,
        sha256,
      },
      resources,
    })
  }

  /// The formula's main source block
  pub fn main_source(&self) -> &SourceBlock {
    &self.main
  }

  /// A named resource block, if present
  pub fn resource(&self, name: &str) -> Option<&SourceBlock> {
    self.resources.iter().find(|(n, _)| n == name).map(|(_, block)| block)
  }

  /// Names of all resource blocks, in file order
  pub fn resource_names(&self) -> Vec<&str> {
    self.resources.iter().map(|(name, _)| name.as_str()).collect()
  }

  /// Rewrite the main source's url and sha256 lines
  pub fn set_main_source(&mut self, url: &str, sha256: &str) {
    rewrite_quoted(&mut self.lines[self.main.url_line], url);
    rewrite_quoted(&mut self.lines[self.main.sha_line], sha256);
    self.main.url = url.to_string();
    self.main.sha256 = sha256.to_string();
  }

  /// Rewrite a named resource's url and sha256 lines
  pub fn set_resource(&mut self, name: &str, url: &str, sha256: &str) -> SlipwayResult<()> {
    let block = self
      .resources
      .iter_mut()
      .find(|(n, _)| n == name)
      .map(|(_, block)| block)
      .ok_or_else(|| SlipwayError::Formula(FormulaError::ResourceNotFound { name: name.to_string() }))?;

    rewrite_quoted(&mut self.lines[block.url_line], url);
    rewrite_quoted(&mut self.lines[block.sha_line], sha256);
    block.url = url.to_string();
    block.sha256 = sha256.to_string();

    Ok(())
  }

  /// Render the formula back to text, byte-identical outside patched lines
  pub fn render(&self) -> String {
    let mut out = self.lines.join("\n");
    if self.trailing_newline {
      out.push('\n');
    }
    out
  }

  /// Write the formula, retaining a backup of the pre-patch file alongside it
  pub fn save_with_backup(&self) -> SlipwayResult<PathBuf> {
    let backup = backup_path(&self.path);
    fs::copy(&self.path, &backup)
      .with_context(|| format!("Failed to back up formula to {}", backup.display()))?;
    fs::write(&self.path, self.render())
      .with_context(|| format!("Failed to write formula {}", self.path.display()))?;
    Ok(backup)
  }
}

/// Backup file next to the original: `datatalk.rb` → `datatalk.rb.bak`
pub fn backup_path(path: &Path) -> PathBuf {
  let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
  name.push(".bak");
  path.with_file_name(name)
}

fn missing_field(path: &Path, field: &str) -> SlipwayError {
  SlipwayError::Formula(FormulaError::MissingField {
    path: path.to_path_buf(),
    field: field.to_string(),
  })
}

/// `resource "name" do` → Some("name")
fn resource_name(trimmed: &str) -> Option<String> {
  let rest = trimmed.strip_prefix("resource ")?;
  if !trimmed.ends_with(" do") {
    return None;
  }
  let open = rest.find('"')?;
  let close = rest[open + 1..].find('"')?;
  Some(rest[open + 1..open + 1 + close].to_string())
}

/// Lines that open a Ruby block the parser must descend into
fn opens_block(trimmed: &str) -> bool {
  trimmed.starts_with("class ")
    || trimmed.starts_with("def ")
    || trimmed.ends_with(" do")
    || trimmed == "do"
}

/// `url "value"` / `sha256 "value"` → Some(value); tolerant of trailing args
fn quoted_value(trimmed: &str, keyword: &str) -> Option<String> {
  let rest = trimmed.strip_prefix(keyword)?;
  let rest = rest.strip_prefix(' ')?;
  let open = rest.find('"')?;
  let close = rest[open + 1..].find('"')?;
  Some(rest[open + 1..open + 1 + close].to_string())
}

/// Replace the first quoted string in a line, preserving everything else
fn rewrite_quoted(line: &mut String, value: &str) {
  let Some(open) = line.find('"') else { return };
  let Some(close) = line[open + 1..].find('"') else { return };
  line.replace_range(open + 1..open + 1 + close, value);
}
