//! Field cipher table of the device profile.
//!
//! Every known profile field is renamed to a short alias on the wire; most
//! are also DES-encrypted under a per-field key. Fields missing from the table
//! keep their name and value.

/// How a single field value is transformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCipher {
    /// Value kept as-is, only the key is renamed
    Plain,
    /// Value encrypted with DES-ECB under the given key
    Des {
        /// 8-byte DES key
        key: [u8; 8],
    },
}

/// Rule for one profile field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncryptionRule {
    /// Logical field name in the profile
    pub field: &'static str,
    /// Name the field is sent under
    pub alias: &'static str,
    /// Transformation applied to the value
    pub cipher: FieldCipher,
}

const fn des(field: &'static str, alias: &'static str, key: &[u8; 8]) -> EncryptionRule {
    EncryptionRule { field, alias, cipher: FieldCipher::Des { key: *key } }
}

const fn plain(field: &'static str, alias: &'static str) -> EncryptionRule {
    EncryptionRule { field, alias, cipher: FieldCipher::Plain }
}

/// Sorted by field name (byte order) for binary search.
pub static FIELD_CIPHER_TABLE: [EncryptionRule; 25] = [
    des("appId", "xx", b"uy7mzc4h"),
    plain("box", "jf"),
    des("canvas", "yk", b"snrn887t"),
    des("clientSize", "zx", b"cpmjjgsu"),
    des("organization", "dp", b"78moqjfc"),
    des("os", "pj", b"je6vk6t4"),
    des("platform", "gm", b"pakxhcd2"),
    des("plugins", "kq", b"v51m3pzl"),
    des("pmf", "vw", b"2mdeslu3"),
    plain("protocol", "protocol"),
    des("referer", "ab", b"y7bmrjlc"),
    des("res", "hf", b"whxqm2a7"),
    des("rtype", "lo", b"x8o2h2bl"),
    des("sdkver", "sc", b"9q3dcxp2"),
    des("status", "an", b"2jbrxxw4"),
    des("subVersion", "ns", b"eo3i2puh"),
    des("svm", "qr", b"fzj3kaeh"),
    des("time", "nb", b"q2t3odsk"),
    des("timezone", "as", b"1uv05lj5"),
    des("tn", "py", b"x9nzj1bp"),
    des("trees", "pi", b"acfs0xo4"),
    des("ua", "bj", b"k92crp1t"),
    des("url", "cf", b"y95hjkoo"),
    plain("version", "version"),
    des("vpw", "ca", b"r9924ab5"),
];

/// Look up the rule for a profile field.
pub fn rule_for(field: &str) -> Option<&'static EncryptionRule> {
    FIELD_CIPHER_TABLE
        .binary_search_by(|rule| rule.field.cmp(field))
        .ok()
        .and_then(|idx| FIELD_CIPHER_TABLE.get(idx))
}
