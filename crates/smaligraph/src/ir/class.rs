use super::ids::{BlockId, ClassId, MethodId};
use super::method::Method;

/// A resolved (or still-pending) local invocation: a call whose target is a
/// method of the *same* class.
#[derive(Debug, Clone)]
pub struct LocalInvocation {
    pub source_method: MethodId,
    pub source_block: BlockId,
    pub target_method_sig: String,
}

/// A cross-class or library invocation: the target class is named explicitly.
#[derive(Debug, Clone)]
pub struct ExternalInvocation {
    pub source_method: MethodId,
    pub source_block: BlockId,
    /// Slash-delimited `path/Name`, no leading `L` or trailing `;`.
    pub target_class_path: String,
    pub target_method_sig: String,
}

/// The outcome of classifying one `invoke*` line (§4.3.5).
#[derive(Debug, Clone)]
pub enum Invocation {
    IntraClass(LocalInvocation),
    CrossClass(ExternalInvocation),
    Library(ExternalInvocation),
}

/// A smali class: its header metadata, its methods, and the three
/// invocation lists awaiting resolution (C4/C5).
#[derive(Debug, Clone)]
pub struct Class {
    pub id: ClassId,
    pub short_name: String,
    pub path: String,
    pub superclass: String,
    pub source_file: String,
    pub annotation_text: String,
    pub field_text: String,
    pub methods: Vec<Method>,
    pub intra_class: Vec<LocalInvocation>,
    pub cross_class: Vec<ExternalInvocation>,
    pub library: Vec<ExternalInvocation>,
}

impl Class {
    pub fn new(id: ClassId, short_name: String, path: String) -> Self {
        Self {
            id,
            short_name,
            path,
            superclass: String::new(),
            source_file: String::new(),
            annotation_text: String::new(),
            field_text: String::new(),
            methods: Vec::new(),
            intra_class: Vec::new(),
            cross_class: Vec::new(),
            library: Vec::new(),
        }
    }

    /// Parse a `.class` header's trailing token into (short_name, path), per §4.2.
    pub fn parse_header(line: &str) -> Option<(String, String)> {
        let token = line.split_whitespace().last()?;
        let token = token.trim_start_matches('L').trim_end_matches(';');
        let mut segments: Vec<&str> = token.split('/').collect();
        let short_name = segments.pop()?.to_string();
        let path = segments.join("/");
        Some((short_name, path))
    }

    /// Attach a `.super` directive's trailing token, per `process_class_header`'s
    /// sibling `add_super` in the reference implementation.
    pub fn set_super(&mut self, line: &str) {
        if let Some(token) = line.split_whitespace().last() {
            self.superclass = token.trim_end_matches(';').to_string();
        }
    }

    /// Attach a `.source` directive's quoted trailing token.
    pub fn set_source(&mut self, line: &str) {
        if let Some(token) = line.split_whitespace().last() {
            self.source_file = token.replace('"', "");
        }
    }

    pub fn full_path(&self) -> String {
        format!("{}/{}", self.path, self.short_name)
    }

    /// The application root namespace: the second `/`-delimited segment of
    /// this class's path (typically the segment after `com`).
    pub fn app_top_level(&self) -> Option<&str> {
        self.path.split('/').nth(1)
    }

    pub fn method_mut(&mut self, id: MethodId) -> Option<&mut Method> {
        self.methods.iter_mut().find(|m| m.id == id)
    }

    pub fn method(&self, id: MethodId) -> Option<&Method> {
        self.methods.iter().find(|m| m.id == id)
    }

    /// First method in the class whose name matches (bare name, no params).
    pub fn find_method_by_name(&self, name: &str) -> Option<MethodId> {
        self.methods.iter().find(|m| m.name == name).map(|m| m.id)
    }

    /// Classify an `invoke*` line already split into its opcode and the
    /// `L...;->name(params)return` tail, per §4.3.5.
    pub fn classify_invocation(
        &self,
        invoke_opcode: &str,
        target_class_token: &str,
        target_method_sig: &str,
        source_method: MethodId,
        source_block: BlockId,
    ) -> Invocation {
        let target_class_raw = target_class_token;
        let target_class_clean = target_class_raw
            .trim_start_matches('L')
            .trim_end_matches(';')
            .to_string();

        if target_class_clean == self.full_path() && invoke_opcode == "invoke-direct" {
            return Invocation::IntraClass(LocalInvocation {
                source_method,
                source_block,
                target_method_sig: target_method_sig.to_string(),
            });
        }

        let app_top_level = self.app_top_level().unwrap_or("");
        let is_cross_class =
            target_class_raw.starts_with("Lcom") && target_class_raw.contains(app_top_level);

        let external = ExternalInvocation {
            source_method,
            source_block,
            target_class_path: target_class_clean,
            target_method_sig: target_method_sig.to_string(),
        };

        if is_cross_class {
            Invocation::CrossClass(external)
        } else {
            Invocation::Library(external)
        }
    }
}
