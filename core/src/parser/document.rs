//! High-level PDF document API: catalog/page-tree navigation layered over
//! [`PdfReader`], the entry point most callers should use instead of the
//! low-level reader directly (see module docs in [`super`]).

use super::header::PdfVersion;
use super::objects::{PdfDictionary, PdfObject};
use super::page_tree::ParsedPage;
use super::reader::{DocumentMetadata, PdfReader};
use super::{ParseError, ParseOptions, ParseResult};
use std::cell::RefCell;
use std::io::{Read, Seek};

/// Text recovered from a page via [`PdfDocument::extract_text_from_page`].
#[derive(Debug, Clone, Default)]
pub struct PageText {
    pub text: String,
}

/// Wraps a [`PdfReader`] behind interior mutability so pages, resources and
/// objects can all be fetched through a shared `&PdfDocument` without the
/// caller needing to thread `&mut` through page-tree recursion.
pub struct PdfDocument<R: Read + Seek> {
    reader: RefCell<PdfReader<R>>,
}

impl<R: Read + Seek> PdfDocument<R> {
    pub fn new(reader: PdfReader<R>) -> Self {
        PdfDocument {
            reader: RefCell::new(reader),
        }
    }

    pub fn page_count(&self) -> ParseResult<u32> {
        self.reader.borrow_mut().page_count()
    }

    pub fn version(&self) -> ParseResult<PdfVersion> {
        Ok(*self.reader.borrow().version())
    }

    pub fn options(&self) -> ParseOptions {
        self.reader.borrow().options().clone()
    }

    pub fn metadata(&self) -> ParseResult<DocumentMetadata> {
        self.reader.borrow_mut().metadata()
    }

    /// Whether the document carries an encryption dictionary the reader
    /// could not unlock with an empty user password.
    pub fn is_encrypted_and_locked(&self) -> bool {
        let reader = self.reader.borrow();
        reader.is_encrypted() && !reader.is_unlocked()
    }

    pub fn get_object(&self, obj_num: u32, gen_num: u16) -> ParseResult<PdfObject> {
        self.reader
            .borrow_mut()
            .get_object(obj_num, gen_num)
            .cloned()
    }

    /// Resolve `obj` one level if it's an indirect reference, otherwise
    /// return it unchanged.
    pub fn resolve(&self, obj: &PdfObject) -> ParseResult<PdfObject> {
        match obj {
            PdfObject::Reference(num, gen) => self.get_object(*num, *gen),
            other => Ok(other.clone()),
        }
    }

    fn catalog(&self) -> ParseResult<PdfDictionary> {
        self.reader.borrow_mut().catalog().cloned()
    }

    fn pages_root(&self) -> ParseResult<PdfDictionary> {
        self.reader.borrow_mut().pages().cloned()
    }

    /// Depth-first walk of the page tree collecting the `target_index`-th
    /// leaf, merging inheritable attributes (`Resources`, `MediaBox`,
    /// `CropBox`, `Rotate`) from ancestors as it descends.
    fn find_page(
        &self,
        node_ref: (u32, u16),
        node: &PdfDictionary,
        inherited: &PdfDictionary,
        target_index: u32,
        current_index: &mut u32,
    ) -> ParseResult<Option<ParsedPage>> {
        let mut merged = inherited.clone();
        for key in ["Resources", "MediaBox", "CropBox", "Rotate"] {
            if let Some(value) = node.get(key) {
                merged.insert(key.to_string(), value.clone());
            }
        }

        match node.get_type() {
            Some("Pages") | None if node.get("Kids").is_some() => {
                let kids = node
                    .get("Kids")
                    .and_then(|o| o.as_array())
                    .ok_or_else(|| ParseError::MissingKey("Kids".to_string()))?
                    .clone();

                for kid in kids.0.iter() {
                    let kid_ref = kid.as_reference().ok_or_else(|| ParseError::SyntaxError {
                        position: 0,
                        message: "Kids array must contain references".to_string(),
                    })?;
                    let kid_obj = self.get_object(kid_ref.0, kid_ref.1)?;
                    let kid_dict = kid_obj.as_dict().cloned().ok_or_else(|| ParseError::SyntaxError {
                        position: 0,
                        message: "page tree node must be a dictionary".to_string(),
                    })?;

                    if let Some(page) =
                        self.find_page(kid_ref, &kid_dict, &merged, target_index, current_index)?
                    {
                        return Ok(Some(page));
                    }
                }
                Ok(None)
            }
            _ => {
                // Leaf page object.
                if *current_index == target_index {
                    let media_box = read_rect(&merged, "MediaBox").unwrap_or([0.0, 0.0, 612.0, 792.0]);
                    let crop_box = read_rect(&merged, "CropBox");
                    let rotation = node
                        .get("Rotate")
                        .or_else(|| merged.get("Rotate"))
                        .and_then(|o| o.as_integer())
                        .unwrap_or(0) as i32;

                    Ok(Some(ParsedPage {
                        obj_ref: node_ref,
                        dict: node.clone(),
                        inherited_resources: merged.get("Resources").and_then(|o| o.as_dict()).cloned(),
                        media_box,
                        crop_box,
                        rotation,
                    }))
                } else {
                    *current_index += 1;
                    Ok(None)
                }
            }
        }
    }

    pub fn get_page(&self, index: u32) -> ParseResult<ParsedPage> {
        let pages_root = self.pages_root()?;
        let catalog = self.catalog()?;
        let pages_ref = catalog
            .get("Pages")
            .and_then(|o| o.as_reference())
            .ok_or_else(|| ParseError::MissingKey("Pages".to_string()))?;

        let mut current_index = 0;
        self.find_page(pages_ref, &pages_root, &PdfDictionary::new(), index, &mut current_index)?
            .ok_or_else(|| ParseError::InvalidReference(index, 0))
    }

    /// A page's own `/Resources`, resolved through an indirect reference if
    /// necessary, falling back to the inherited dictionary collected during
    /// [`PdfDocument::get_page`]'s page-tree walk. `None` if neither exists.
    pub fn get_page_resources(&self, page: &ParsedPage) -> ParseResult<Option<PdfDictionary>> {
        if let Some(resources) = page.dict.get("Resources") {
            let resolved = self.resolve(resources)?;
            if let Some(dict) = resolved.as_dict() {
                return Ok(Some(dict.clone()));
            }
        }
        Ok(page.inherited_resources.clone())
    }

    /// Decode every content stream attached to `page` (a page's `/Contents`
    /// may be a single stream or an array of streams to be concatenated).
    pub fn get_page_content_streams(&self, page: &ParsedPage) -> ParseResult<Vec<Vec<u8>>> {
        let options = self.options();
        let contents = page
            .dict
            .get("Contents")
            .ok_or_else(|| ParseError::MissingKey("Contents".to_string()))?;

        let resolved = self.resolve(contents)?;
        let mut streams = Vec::new();
        match &resolved {
            PdfObject::Stream(stream) => streams.push(stream.decode(&options)?),
            PdfObject::Array(arr) => {
                for item in &arr.0 {
                    let resolved_item = self.resolve(item)?;
                    if let PdfObject::Stream(stream) = resolved_item {
                        streams.push(stream.decode(&options)?);
                    }
                }
            }
            _ => {
                return Err(ParseError::SyntaxError {
                    position: 0,
                    message: "/Contents must be a stream or array of streams".to_string(),
                })
            }
        }
        Ok(streams)
    }

    /// Extract the text shown by `Tj`/`TJ`/`'`/`"` operators on page `index`,
    /// in content-stream order, without positional layout analysis.
    pub fn extract_text_from_page(&self, index: u32) -> ParseResult<PageText> {
        let page = self.get_page(index)?;
        let streams = self.get_page_content_streams(&page)?;
        let mut text = String::new();
        for stream in streams {
            let ops = super::content::ContentParser::parse(&stream)?;
            for op in ops {
                if let super::content::ContentOperation::ShowText(bytes) = op {
                    text.push_str(&String::from_utf8_lossy(&bytes));
                }
            }
        }
        Ok(PageText { text })
    }
}

fn read_rect(dict: &PdfDictionary, key: &str) -> Option<[f64; 4]> {
    let arr = dict.get(key)?.as_array()?;
    if arr.len() != 4 {
        return None;
    }
    Some([
        arr.get(0)?.as_real()?,
        arr.get(1)?.as_real()?,
        arr.get(2)?.as_real()?,
        arr.get(3)?.as_real()?,
    ])
}

/// Resolves and caches a page's `Font`/`XObject`/`ColorSpace` resources.
/// Most callers can use [`PdfDocument::resolve`] directly; this exists for
/// code that wants a longer-lived handle scoped to one page's resources.
pub struct ResourceManager {
    resources: PdfDictionary,
}

impl ResourceManager {
    pub fn new(resources: PdfDictionary) -> Self {
        ResourceManager { resources }
    }

    pub fn get_font(&self, name: &str) -> Option<&PdfObject> {
        self.resources.get("Font").and_then(|f| f.as_dict()).and_then(|d| d.get(name))
    }

    pub fn get_xobject(&self, name: &str) -> Option<&PdfObject> {
        self.resources
            .get("XObject")
            .and_then(|f| f.as_dict())
            .and_then(|d| d.get(name))
    }

    pub fn dict(&self) -> &PdfDictionary {
        &self.resources
    }
}
