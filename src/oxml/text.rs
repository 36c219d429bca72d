//! Paragraph-level element types: `w:body`, `w:p`, `w:r` and their properties.

use super::element::{OxmlElement, define_element};
use super::note::{EndnoteReference, FootnoteReference, NoteReferenceElement};
use super::schema::{AttrKind, AttrSpec, ChildSpec, ElementSchema};
use super::simpletypes::VerticalAlignRun;
use crate::error::Result;
use crate::xml::name::XML;
use crate::xml::{NodeId, QName, XmlTree};

const VAL: QName<'static> = QName::w("val");
const XML_SPACE: QName<'static> = QName::new(XML, "space");

const TAB: QName<'static> = QName::w("tab");
const BR: QName<'static> = QName::w("br");
const CR: QName<'static> = QName::w("cr");
const SECT_PR: QName<'static> = QName::w("sectPr");

/// Style applied to note reference marks in running text.
pub const FOOTNOTE_REFERENCE_STYLE: &str = "FootnoteReference";
pub const ENDNOTE_REFERENCE_STYLE: &str = "EndnoteReference";

// ============================================================================
// Schemas
// ============================================================================

pub static BODY: ElementSchema = ElementSchema {
    tag: QName::w("body"),
    children: &[ChildSpec::zero_or_more(QName::w("p")), ChildSpec::zero_or_one(SECT_PR)],
    attributes: &[],
};

pub static P: ElementSchema = ElementSchema {
    tag: QName::w("p"),
    children: &[
        ChildSpec::zero_or_one(QName::w("pPr")),
        ChildSpec::zero_or_more(QName::w("r")),
    ],
    attributes: &[],
};

pub static P_PR: ElementSchema = ElementSchema {
    tag: QName::w("pPr"),
    children: &[ChildSpec::zero_or_one(QName::w("pStyle"))],
    attributes: &[],
};

pub static R: ElementSchema = ElementSchema {
    tag: QName::w("r"),
    children: &[
        ChildSpec::zero_or_one(QName::w("rPr")),
        ChildSpec::zero_or_more(QName::w("t")),
        ChildSpec::zero_or_more(QName::w("footnoteReference")),
        ChildSpec::zero_or_more(QName::w("endnoteReference")),
    ],
    attributes: &[],
};

pub static R_PR: ElementSchema = ElementSchema {
    tag: QName::w("rPr"),
    children: &[
        ChildSpec::zero_or_one(QName::w("rStyle")),
        ChildSpec::zero_or_one(QName::w("b")),
        ChildSpec::zero_or_one(QName::w("i")),
        ChildSpec::zero_or_one(QName::w("vertAlign")),
    ],
    attributes: &[],
};

pub static T: ElementSchema = ElementSchema {
    tag: QName::w("t"),
    children: &[],
    attributes: &[AttrSpec::optional(XML_SPACE, AttrKind::String)],
};

pub static P_STYLE: ElementSchema = ElementSchema {
    tag: QName::w("pStyle"),
    children: &[],
    attributes: &[AttrSpec::required(VAL, AttrKind::String)],
};

pub static R_STYLE: ElementSchema = ElementSchema {
    tag: QName::w("rStyle"),
    children: &[],
    attributes: &[AttrSpec::required(VAL, AttrKind::String)],
};

pub static B: ElementSchema = ElementSchema {
    tag: QName::w("b"),
    children: &[],
    attributes: &[AttrSpec::with_default(VAL, AttrKind::Bool, "1")],
};

pub static I: ElementSchema = ElementSchema {
    tag: QName::w("i"),
    children: &[],
    attributes: &[AttrSpec::with_default(VAL, AttrKind::Bool, "1")],
};

pub static VERT_ALIGN: ElementSchema = ElementSchema {
    tag: QName::w("vertAlign"),
    children: &[],
    attributes: &[AttrSpec::required(VAL, AttrKind::Token(VerticalAlignRun::TOKENS))],
};

// ============================================================================
// Wrappers
// ============================================================================

define_element! {
    /// `<w:body>`: the main story of a document.
    pub struct Body => BODY;
}

define_element! {
    /// `<w:p>`
    pub struct Paragraph => P;
}

define_element! {
    /// `<w:pPr>`
    pub struct ParagraphProperties => P_PR;
}

define_element! {
    /// `<w:r>`: a run of uniformly formatted content.
    pub struct Run => R;
}

define_element! {
    /// `<w:rPr>`
    pub struct RunProperties => R_PR;
}

define_element! {
    /// `<w:t>`
    pub struct Text => T;
}

define_element! {
    pub struct ParagraphStyle => P_STYLE;
}

define_element! {
    pub struct RunStyle => R_STYLE;
}

define_element! {
    pub struct Bold => B;
}

define_element! {
    pub struct Italic => I;
}

define_element! {
    pub struct VerticalAlign => VERT_ALIGN;
}

impl Body {
    pub fn paragraphs(self, tree: &XmlTree) -> Result<Vec<Paragraph>> {
        self.children(tree)
    }

    /// Append a paragraph, keeping it before any `w:sectPr`.
    pub fn add_paragraph(self, tree: &mut XmlTree) -> Result<Paragraph> {
        self.add(tree)
    }

    pub fn section_properties(self, tree: &XmlTree) -> Result<Option<NodeId>> {
        self.child_by_tag(tree, SECT_PR)
    }
}

impl Paragraph {
    pub fn runs(self, tree: &XmlTree) -> Result<Vec<Run>> {
        self.children(tree)
    }

    pub fn add_run(self, tree: &mut XmlTree) -> Result<Run> {
        self.add(tree)
    }

    pub fn properties(self, tree: &XmlTree) -> Result<Option<ParagraphProperties>> {
        self.child(tree)
    }

    /// Paragraph style id from `w:pPr/w:pStyle`.
    pub fn style(self, tree: &XmlTree) -> Result<Option<String>> {
        let Some(ppr) = self.properties(tree)? else {
            return Ok(None);
        };
        match ppr.child::<ParagraphStyle>(tree)? {
            Some(style) => style.required_attr(tree, VAL).map(Some),
            None => Ok(None),
        }
    }

    pub fn set_style(self, tree: &mut XmlTree, style: Option<&str>) -> Result<()> {
        match style {
            Some(id) => {
                let ppr = self.get_or_add::<ParagraphProperties>(tree)?;
                let style = ppr.get_or_add::<ParagraphStyle>(tree)?;
                style.set_attr(tree, VAL, Some(&id.to_string()))
            }
            None => {
                if let Some(ppr) = self.properties(tree)? {
                    ppr.remove::<ParagraphStyle>(tree)?;
                }
                Ok(())
            }
        }
    }

    /// Text of every run, in order.
    pub fn text(self, tree: &XmlTree) -> Result<String> {
        let mut out = String::new();
        for run in self.runs(tree)? {
            out.push_str(&run.text(tree));
        }
        Ok(out)
    }
}

impl Run {
    pub fn properties(self, tree: &XmlTree) -> Result<Option<RunProperties>> {
        self.child(tree)
    }

    pub fn get_or_add_properties(self, tree: &mut XmlTree) -> Result<RunProperties> {
        self.get_or_add(tree)
    }

    /// Run text. Tabs and breaks map to `\t` and `\n`.
    pub fn text(self, tree: &XmlTree) -> String {
        let mut out = String::new();
        for &child in tree.children(self.node()) {
            match tree.name(child) {
                Some(name) if name == T.tag => out.push_str(&tree.text(child)),
                Some(name) if name == TAB => out.push('\t'),
                Some(name) if name == BR || name == CR => out.push('\n'),
                _ => {}
            }
        }
        out
    }

    /// Append a `w:t`, marking it space-preserving when the text has
    /// leading or trailing whitespace.
    pub fn add_text(self, tree: &mut XmlTree, text: &str) -> Result<Text> {
        let t = self.add::<Text>(tree)?;
        if text.trim() != text {
            t.set_attr(tree, XML_SPACE, Some(&"preserve".to_string()))?;
        }
        tree.append_text(t.node(), text);
        Ok(t)
    }

    pub fn footnote_references(self, tree: &XmlTree) -> Result<Vec<FootnoteReference>> {
        self.children(tree)
    }

    pub fn endnote_references(self, tree: &XmlTree) -> Result<Vec<EndnoteReference>> {
        self.children(tree)
    }

    /// Append a footnote reference mark pointing at note `id`.
    pub fn add_footnote_reference(self, tree: &mut XmlTree, id: i64) -> Result<FootnoteReference> {
        self.add_reference::<FootnoteReference>(tree, id, FOOTNOTE_REFERENCE_STYLE)
    }

    /// Append an endnote reference mark pointing at note `id`.
    pub fn add_endnote_reference(self, tree: &mut XmlTree, id: i64) -> Result<EndnoteReference> {
        self.add_reference::<EndnoteReference>(tree, id, ENDNOTE_REFERENCE_STYLE)
    }

    fn add_reference<N: NoteReferenceElement>(self, tree: &mut XmlTree, id: i64, style: &str) -> Result<N> {
        let reference = self.add::<N>(tree)?;
        reference.set_id(tree, id)?;
        let rpr = self.get_or_add_properties(tree)?;
        if rpr.style(tree)?.is_none() {
            rpr.set_style(tree, Some(style))?;
        }
        Ok(reference)
    }
}

impl RunProperties {
    /// Character style id from `w:rStyle`.
    pub fn style(self, tree: &XmlTree) -> Result<Option<String>> {
        match self.child::<RunStyle>(tree)? {
            Some(style) => style.required_attr(tree, VAL).map(Some),
            None => Ok(None),
        }
    }

    pub fn set_style(self, tree: &mut XmlTree, style: Option<&str>) -> Result<()> {
        match style {
            Some(id) => {
                let rstyle = self.get_or_add::<RunStyle>(tree)?;
                rstyle.set_attr(tree, VAL, Some(&id.to_string()))
            }
            None => self.remove::<RunStyle>(tree).map(|_| ()),
        }
    }

    /// `None` when `w:b` is absent; otherwise its on/off value.
    pub fn bold(self, tree: &XmlTree) -> Result<Option<bool>> {
        match self.child::<Bold>(tree)? {
            Some(b) => b.attr(tree, VAL),
            None => Ok(None),
        }
    }

    pub fn set_bold(self, tree: &mut XmlTree, value: Option<bool>) -> Result<()> {
        match value {
            Some(on) => {
                let b = self.get_or_add::<Bold>(tree)?;
                b.set_attr(tree, VAL, Some(&on))
            }
            None => self.remove::<Bold>(tree).map(|_| ()),
        }
    }

    pub fn italic(self, tree: &XmlTree) -> Result<Option<bool>> {
        match self.child::<Italic>(tree)? {
            Some(i) => i.attr(tree, VAL),
            None => Ok(None),
        }
    }

    pub fn set_italic(self, tree: &mut XmlTree, value: Option<bool>) -> Result<()> {
        match value {
            Some(on) => {
                let i = self.get_or_add::<Italic>(tree)?;
                i.set_attr(tree, VAL, Some(&on))
            }
            None => self.remove::<Italic>(tree).map(|_| ()),
        }
    }

    pub fn vert_align(self, tree: &XmlTree) -> Result<Option<VerticalAlignRun>> {
        match self.child::<VerticalAlign>(tree)? {
            Some(v) => v.required_attr(tree, VAL).map(Some),
            None => Ok(None),
        }
    }

    pub fn set_vert_align(self, tree: &mut XmlTree, value: Option<VerticalAlignRun>) -> Result<()> {
        match value {
            Some(align) => {
                let v = self.get_or_add::<VerticalAlign>(tree)?;
                v.set_attr(tree, VAL, Some(&align))
            }
            None => self.remove::<VerticalAlign>(tree).map(|_| ()),
        }
    }
}

impl Text {
    pub fn space(self, tree: &XmlTree) -> Result<Option<String>> {
        self.attr(tree, XML_SPACE)
    }
}
