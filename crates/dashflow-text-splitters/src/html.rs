// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! HTML-specific text splitters.
//!
//! This module provides splitters optimized for HTML documents:
//! - [`HTMLTextSplitter`]: Split on HTML tag boundaries
//! - [`HTMLHeaderTextSplitter`]: Split with header metadata extraction

use crate::character::RecursiveCharacterTextSplitter;
use crate::traits::TextSplitter;

/// HTML-specific text splitter
#[derive(Debug, Clone)]
pub struct HTMLTextSplitter {
    inner: RecursiveCharacterTextSplitter,
}

impl HTMLTextSplitter {
    /// Create a new `HTMLTextSplitter` with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RecursiveCharacterTextSplitter::new()
                .with_separators(Self::get_separators())
                .with_separator_regex(false),
        }
    }

    /// Get the default separators for HTML
    #[must_use]
    pub fn get_separators() -> Vec<String> {
        vec![
            "<body".to_string(),
            "<div".to_string(),
            "<p".to_string(),
            "<br".to_string(),
            "<li".to_string(),
            "<h1".to_string(),
            "<h2".to_string(),
            "<h3".to_string(),
            "<h4".to_string(),
            "<h5".to_string(),
            "<h6".to_string(),
            "<span".to_string(),
            "<table".to_string(),
            "<tr".to_string(),
            "<td".to_string(),
            "<th".to_string(),
            "<ul".to_string(),
            "<ol".to_string(),
            "<header".to_string(),
            "<footer".to_string(),
            "<nav".to_string(),
            "<head".to_string(),
            "<style".to_string(),
            "<script".to_string(),
            "<meta".to_string(),
            "<title".to_string(),
            String::new(),
        ]
    }

    /// Set custom chunk size
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.inner = self.inner.with_chunk_size(chunk_size);
        self
    }

    /// Set custom chunk overlap
    #[must_use]
    pub fn with_chunk_overlap(mut self, chunk_overlap: usize) -> Self {
        self.inner = self.inner.with_chunk_overlap(chunk_overlap);
        self
    }
}

impl Default for HTMLTextSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl TextSplitter for HTMLTextSplitter {
    fn split_text(&self, text: &str) -> Vec<String> {
        self.inner.split_text(text)
    }

    fn chunk_size(&self) -> usize {
        self.inner.chunk_size()
    }

    fn chunk_overlap(&self) -> usize {
        self.inner.chunk_overlap()
    }

    fn add_start_index(&self) -> bool {
        self.inner.add_start_index()
    }
}

/// HTML header text splitter that extracts header hierarchy as metadata
#[derive(Debug, Clone)]
pub struct HTMLHeaderTextSplitter {
    header_mapping: std::collections::HashMap<String, String>,
    header_tags: Vec<String>,
    return_each_element: bool,
}

impl HTMLHeaderTextSplitter {
    /// Create a new `HTMLHeaderTextSplitter`
    #[must_use]
    pub fn new(headers_to_split_on: Vec<(String, String)>) -> Self {
        let mut sorted_headers = headers_to_split_on;
        sorted_headers.sort_by_key(|(tag, _)| {
            tag.trim_start_matches('h').parse::<u32>().unwrap_or(9999)
        });

        let header_mapping: std::collections::HashMap<_, _> =
            sorted_headers.iter().cloned().collect();
        let header_tags: Vec<_> = sorted_headers.iter().map(|(tag, _)| tag.clone()).collect();

        Self {
            header_mapping,
            header_tags,
            return_each_element: false,
        }
    }

    /// Set whether to return each element as a separate document
    #[must_use]
    pub fn with_return_each_element(mut self, return_each_element: bool) -> Self {
        self.return_each_element = return_each_element;
        self
    }

    /// Split HTML text into documents with header metadata
    #[must_use]
    #[allow(clippy::unwrap_used)] // Static CSS selector "body" is always valid
    pub fn split_text(&self, text: &str) -> Vec<crate::Document> {
        use scraper::{Html, Node, Selector};

        let document = Html::parse_document(text);

        let mut active_headers: std::collections::HashMap<String, (String, u32, usize)> =
            std::collections::HashMap::new();
        let mut current_chunk: Vec<String> = Vec::new();
        let mut result: Vec<crate::Document> = Vec::new();

        let finalize_chunk =
            |current_chunk: &mut Vec<String>,
             active_headers: &std::collections::HashMap<String, (String, u32, usize)>|
             -> Option<crate::Document> {
                if current_chunk.is_empty() {
                    return None;
                }

                let final_text = current_chunk
                    .iter()
                    .filter(|s| !s.trim().is_empty())
                    .cloned()
                    .collect::<Vec<_>>()
                    .join("  \n");
                current_chunk.clear();

                if final_text.trim().is_empty() {
                    return None;
                }

                let mut doc = crate::Document::new(final_text);
                doc.metadata = active_headers
                    .iter()
                    .map(|(k, (v, _, _))| (k.clone(), serde_json::Value::String(v.clone())))
                    .collect();
                Some(doc)
            };

        let mut stack: Vec<(scraper::ElementRef, usize)> = Vec::new();

        let body_selector = Selector::parse("body").unwrap();
        let body = document
            .select(&body_selector)
            .next()
            .unwrap_or_else(|| document.root_element());

        stack.push((body, 0));

        while let Some((node, dom_depth)) = stack.pop() {
            let children: Vec<_> = node.children().collect();
            for child in children.iter().rev() {
                if let Some(elem) = scraper::ElementRef::wrap(*child) {
                    stack.push((elem, dom_depth + 1));
                }
            }

            let tag = node.value().name();

            let node_text: Vec<String> = node
                .children()
                .filter_map(|child| {
                    if let Node::Text(text) = child.value() {
                        let trimmed = text.trim();
                        if trimmed.is_empty() {
                            None
                        } else {
                            Some(trimmed.to_string())
                        }
                    } else {
                        None
                    }
                })
                .collect();

            let node_text = node_text.join(" ");
            if node_text.is_empty() {
                continue;
            }

            if self.header_tags.contains(&tag.to_string()) {
                if !self.return_each_element {
                    if let Some(doc) = finalize_chunk(&mut current_chunk, &active_headers) {
                        result.push(doc);
                    }
                }

                let level = tag.trim_start_matches('h').parse::<u32>().unwrap_or(9999);
                active_headers.retain(|_, (_, lvl, _)| *lvl < level);

                if let Some(header_name) = self.header_mapping.get(tag) {
                    active_headers
                        .insert(header_name.clone(), (node_text.clone(), level, dom_depth));
                }

                let mut header_doc = crate::Document::new(node_text);
                header_doc.metadata = active_headers
                    .iter()
                    .map(|(k, (v, _, _))| (k.clone(), serde_json::Value::String(v.clone())))
                    .collect();
                result.push(header_doc);
            } else {
                active_headers.retain(|_, (_, _, d)| dom_depth >= *d);

                if self.return_each_element {
                    let mut doc = crate::Document::new(node_text);
                    doc.metadata = active_headers
                        .iter()
                        .map(|(k, (v, _, _))| (k.clone(), serde_json::Value::String(v.clone())))
                        .collect();
                    result.push(doc);
                } else {
                    current_chunk.push(node_text);
                }
            }
        }

        if !self.return_each_element {
            if let Some(doc) = finalize_chunk(&mut current_chunk, &active_headers) {
                result.push(doc);
            }
        }

        result
    }
}
