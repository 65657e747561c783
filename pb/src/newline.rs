//! CR/LF translation for pasteboard text.
//!
//! Pasteboard plain text conventionally uses CR line breaks; unix pipes
//! speak LF. The table swaps ^M (\x0d) and ^J (\x0a) and leaves every
//! other byte alone, so applying it twice is the identity.

const NL_TRANSLATE: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = i as u8;
        i += 1;
    }
    table[b'\n' as usize] = b'\r';
    table[b'\r' as usize] = b'\n';
    table
};

/// Swap CR and LF throughout the buffer.
pub fn translate_in_place(buf: &mut [u8]) {
    for b in buf.iter_mut() {
        *b = NL_TRANSLATE[*b as usize];
    }
}

/// Whether a content-type tag names a text type. The tags pb handles all
/// spell it out ("public.utf8-plain-text", "text/plain", ...); translation
/// defaults on for these and off for everything else.
pub fn is_text_type(tag: &str) -> bool {
    tag.contains("text")
}
