//! Classification of a single trimmed smali line into a [`Kind`].
//!
//! `classify` never inspects parser state — it is a pure function of the
//! line's text. Matching is prefix-anchored and case-sensitive; the more
//! specific of any two overlapping directives (`.end method` vs `.method`)
//! is always tried first.

/// The closed set of instruction/directive kinds a smali line can classify as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Nop,
    Move,
    Return,
    Const,
    ConstString,
    Monitor,
    CheckCast,
    InstanceOf,
    ArrayLength,
    NewInstance,
    NewArray,
    FilledNewArray,
    FillArrayData,
    Throw,
    Goto,
    PackedSwitch,
    SparseSwitch,
    Cmp,
    If,
    Aget,
    Aput,
    Iget,
    Iput,
    Sget,
    Sput,
    Invoke,
    Neg,
    Not,
    IntTo,
    LongTo,
    FloatTo,
    DoubleTo,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Ushr,
    Rsub,

    Class,
    Super,
    Source,
    MethodStart,
    MethodEnd,
    FieldStart,
    FieldEnd,
    Label,
    Comment,
    Line,
    Local,
    Param,
    AnnotationStart,
    AnnotationEnd,
    PswitchStart,
    PswitchEnd,
    SswitchStart,
    SswitchEnd,

    /// No pattern matched.
    Other,
    /// Never produced by `classify` — reserved for instructions synthesized
    /// by the interprocedural resolver's library stubs.
    Dummy,
}

impl Kind {
    /// Does this kind close the current block once appended (§4.3.2)?
    pub fn is_terminator(self) -> bool {
        matches!(
            self,
            Kind::Return | Kind::Goto | Kind::If | Kind::Invoke | Kind::MethodEnd
        )
    }
}

/// Classify a single line, already trimmed and stripped of any trailing `#` comment.
pub fn classify(line: &str) -> Kind {
    if line.is_empty() {
        return Kind::Other;
    }
    if let Some(kind) = classify_directive(line) {
        return kind;
    }
    if line.starts_with(':') {
        return Kind::Label;
    }
    if line.starts_with('#') {
        return Kind::Comment;
    }
    classify_bytecode(line)
}

fn classify_directive(line: &str) -> Option<Kind> {
    if !line.starts_with('.') {
        return None;
    }
    // `.end X` forms must be tried before their `.X` opener, and switch
    // regions are checked before the bare `.method`/`.field` openers they
    // can nest inside, matching the source's dispatch order.
    let kind = if line.starts_with(".end method") {
        Kind::MethodEnd
    } else if line.starts_with(".method") {
        Kind::MethodStart
    } else if line.starts_with(".end field") {
        Kind::FieldEnd
    } else if line.starts_with(".field") {
        Kind::FieldStart
    } else if line.starts_with(".end annotation") {
        Kind::AnnotationEnd
    } else if line.starts_with(".annotation") {
        Kind::AnnotationStart
    } else if line.starts_with(".end packed-switch") {
        Kind::PswitchEnd
    } else if line.starts_with(".packed-switch") {
        Kind::PswitchStart
    } else if line.starts_with(".end sparse-switch") {
        Kind::SswitchEnd
    } else if line.starts_with(".sparse-switch") {
        Kind::SswitchStart
    } else if line.starts_with(".class") {
        Kind::Class
    } else if line.starts_with(".super") {
        Kind::Super
    } else if line.starts_with(".source") {
        Kind::Source
    } else if line.starts_with(".line") {
        Kind::Line
    } else if line.starts_with(".local") {
        Kind::Local
    } else if line.starts_with(".param") {
        Kind::Param
    } else {
        return None;
    };
    Some(kind)
}

fn classify_bytecode(line: &str) -> Kind {
    const TABLE: &[(&str, Kind)] = &[
        ("const-string", Kind::ConstString),
        ("const", Kind::Const),
        ("check-cast", Kind::CheckCast),
        ("instance-of", Kind::InstanceOf),
        ("array-length", Kind::ArrayLength),
        ("filled-new-array", Kind::FilledNewArray),
        ("new-instance", Kind::NewInstance),
        ("new-array", Kind::NewArray),
        ("fill-array-data", Kind::FillArrayData),
        ("monitor", Kind::Monitor),
        ("throw", Kind::Throw),
        ("goto", Kind::Goto),
        ("packed-switch", Kind::PackedSwitch),
        ("sparse-switch", Kind::SparseSwitch),
        ("cmp", Kind::Cmp),
        ("if-", Kind::If),
        ("aget", Kind::Aget),
        ("aput", Kind::Aput),
        ("iget", Kind::Iget),
        ("iput", Kind::Iput),
        ("sget", Kind::Sget),
        ("sput", Kind::Sput),
        ("invoke", Kind::Invoke),
        ("neg-", Kind::Neg),
        ("not-", Kind::Not),
        ("int-to-", Kind::IntTo),
        ("long-to-", Kind::LongTo),
        ("float-to-", Kind::FloatTo),
        ("double-to-", Kind::DoubleTo),
        ("add-", Kind::Add),
        ("sub-", Kind::Sub),
        ("mul-", Kind::Mul),
        ("div-", Kind::Div),
        ("rem-", Kind::Rem),
        ("rsub-", Kind::Rsub),
        ("and-", Kind::And),
        ("or-", Kind::Or),
        ("xor-", Kind::Xor),
        ("shl-", Kind::Shl),
        ("shr-", Kind::Shr),
        ("ushr-", Kind::Ushr),
        ("nop", Kind::Nop),
        ("move", Kind::Move),
        ("return", Kind::Return),
    ];
    for (prefix, kind) in TABLE {
        if line.starts_with(prefix) {
            return *kind;
        }
    }
    Kind::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_directives_with_end_before_start() {
        assert_eq!(classify(".method public f()V"), Kind::MethodStart);
        assert_eq!(classify(".end method"), Kind::MethodEnd);
        assert_eq!(classify(".field private x:I"), Kind::FieldStart);
        assert_eq!(classify(".end field"), Kind::FieldEnd);
    }

    #[test]
    fn classifies_switch_directives() {
        assert_eq!(
            classify(".packed-switch 0x0"),
            Kind::PswitchStart
        );
        assert_eq!(classify(".end packed-switch"), Kind::PswitchEnd);
        assert_eq!(classify(".sparse-switch"), Kind::SswitchStart);
        assert_eq!(classify(".end sparse-switch"), Kind::SswitchEnd);
    }

    #[test]
    fn classifies_labels_and_const_string_before_const() {
        assert_eq!(classify(":cond_0"), Kind::Label);
        assert_eq!(
            classify("const-string v0, \"hi\""),
            Kind::ConstString
        );
        assert_eq!(classify("const/4 v0, 0x1"), Kind::Const);
        assert_eq!(classify("const-wide v0, 0x1"), Kind::Const);
    }

    #[test]
    fn groups_typed_suffixes_into_one_kind() {
        assert_eq!(classify("aget-object v0, v1, v2"), Kind::Aget);
        assert_eq!(classify("aget-wide v0, v1, v2"), Kind::Aget);
        assert_eq!(classify("aput-boolean v0, v1, v2"), Kind::Aput);
    }

    #[test]
    fn classifies_invoke_and_arithmetic() {
        assert_eq!(
            classify("invoke-direct {p0}, Lfoo/Bar;-><init>()V"),
            Kind::Invoke
        );
        assert_eq!(classify("add-int/2addr v0, v1"), Kind::Add);
        assert_eq!(classify("rsub-int v0, v1, 0x0"), Kind::Rsub);
        assert_eq!(classify("sub-int v0, v1, v2"), Kind::Sub);
    }

    #[test]
    fn unmatched_line_is_other() {
        // `.locals 2` is not actually unmatched: `.local` is a valid prefix
        // match (the original's `^\.local` regex matches `.locals` too), so
        // this classifies as `Kind::Local`, not `Kind::Other`.
        assert_eq!(classify(".locals 2"), Kind::Local);
        assert_eq!(classify("nonsense-line"), Kind::Other);
    }

    #[test]
    fn terminators_match_spec_set() {
        assert!(Kind::Return.is_terminator());
        assert!(Kind::Goto.is_terminator());
        assert!(Kind::If.is_terminator());
        assert!(Kind::Invoke.is_terminator());
        assert!(Kind::MethodEnd.is_terminator());
        assert!(!Kind::Const.is_terminator());
    }
}
