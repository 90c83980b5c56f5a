//! Owned document trees and a read-only view over their elements.

use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::ffi;

/// A fully materialized, parsed XML document.
///
/// The whole tree lives in memory until the value is dropped; ownership
/// transfers to whoever [`crate::assert_valid`] returns it to.
pub struct Document {
    doc: NonNull<ffi::XmlDoc>,
}

// The tree is exclusively owned and libxml2 documents carry no thread
// affinity. Not Sync: node accessors are unguarded.
unsafe impl Send for Document {}

impl Document {
    /// Take ownership of a parsed tree.
    ///
    /// # Safety
    /// `doc` must point to a live document that nothing else will free.
    pub(crate) unsafe fn from_raw(doc: NonNull<ffi::XmlDoc>) -> Self {
        Self { doc }
    }

    pub(crate) fn as_ptr(&self) -> *mut ffi::XmlDoc {
        self.doc.as_ptr()
    }

    /// The document's root element, if the document has one.
    pub fn root(&self) -> Option<Element<'_>> {
        let node = unsafe { ffi::xmlDocGetRootElement(self.doc.as_ptr()) };
        NonNull::new(node).map(|node| Element {
            node,
            _doc: PhantomData,
        })
    }
}

impl Drop for Document {
    fn drop(&mut self) {
        unsafe { ffi::xmlFreeDoc(self.doc.as_ptr()) };
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("root", &self.root().map(|root| root.name()))
            .finish()
    }
}

/// Borrowed, read-only view of one element in a [`Document`].
#[derive(Clone, Copy)]
pub struct Element<'d> {
    node: NonNull<ffi::XmlNode>,
    _doc: PhantomData<&'d Document>,
}

impl<'d> Element<'d> {
    /// Local element name, without any namespace prefix.
    pub fn name(&self) -> String {
        unsafe { ffi::peek_xml_string(self.node.as_ref().name) }.unwrap_or_default()
    }

    /// Namespace URI the element belongs to, if any.
    pub fn namespace(&self) -> Option<String> {
        let ns = unsafe { self.node.as_ref().ns };
        if ns.is_null() {
            return None;
        }
        unsafe { ffi::peek_xml_string((*ns).href) }
    }

    /// Value of the named attribute, if present.
    pub fn attribute(&self, name: &str) -> Option<String> {
        let c_name = std::ffi::CString::new(name).ok()?;
        unsafe {
            let value = ffi::xmlGetProp(self.node.as_ptr(), c_name.as_ptr() as *const ffi::XmlChar);
            ffi::take_xml_string(value)
        }
    }

    /// Concatenated text content of the element and its descendants.
    pub fn text(&self) -> String {
        unsafe {
            let content = ffi::xmlNodeGetContent(self.node.as_ptr());
            ffi::take_xml_string(content)
        }
        .unwrap_or_default()
    }

    /// Iterator over the element's direct element children, in document
    /// order. Text, comment and PI nodes are skipped.
    pub fn children(&self) -> Children<'d> {
        Children {
            next: unsafe { ffi::xmlFirstElementChild(self.node.as_ptr()) },
            _doc: PhantomData,
        }
    }
}

impl std::fmt::Debug for Element<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element")
            .field("name", &self.name())
            .field("namespace", &self.namespace())
            .finish()
    }
}

/// Iterator over an element's direct element children.
pub struct Children<'d> {
    next: *mut ffi::XmlNode,
    _doc: PhantomData<&'d Document>,
}

impl<'d> Iterator for Children<'d> {
    type Item = Element<'d>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = NonNull::new(self.next)?;
        self.next = unsafe { ffi::xmlNextElementSibling(node.as_ptr()) };
        Some(Element {
            node,
            _doc: PhantomData,
        })
    }
}
