//! Stub body synthesis: layered return-statement lookup, then shape
//! heuristics for types the table does not name.

use crate::config::Config;
use crate::model::Signature;

/// How the body for one signature was decided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution<'a> {
    /// Table hit: canned statements.
    Table(&'a str),
    /// Constructor, destructor, or `void`: an empty body is correct.
    Empty,
    /// Nothing matched; the body stays empty and the caller reports it.
    Miss,
}

/// Resolves the body statements for one signature. Most-specific key first:
/// `"ret Class::method"`, then `"ret Class::"`, then the bare return type,
/// then the shape fallbacks.
pub fn resolve<'a>(cfg: &'a Config, sig: &Signature) -> Resolution<'a> {
    if sig.is_ctor_like || sig.return_type == "void" {
        return Resolution::Empty;
    }
    let ret = sig.return_type.as_str();
    if ret.is_empty() {
        return Resolution::Miss;
    }
    if !sig.class_name.is_empty() {
        let key = format!("{ret} {}::{}", sig.class_name, sig.func_name);
        if let Some(body) = cfg.return_statements.get(&key) {
            return Resolution::Table(body);
        }
        let key = format!("{ret} {}::", sig.class_name);
        if let Some(body) = cfg.return_statements.get(&key) {
            return Resolution::Table(body);
        }
    }
    if let Some(body) = cfg.return_statements.get(ret) {
        return Resolution::Table(body);
    }
    // References resolve by table key only; the shape fallbacks below
    // return temporaries.
    if ret.ends_with('&') {
        return Resolution::Miss;
    }
    // Pointers beat containers when a type is both.
    let retry = if ret.ends_with('*') || ret.starts_with("std::unique_ptr") {
        Some("Ptr")
    } else if ret.starts_with("std::map")
        || ret.starts_with("std::set")
        || ret.starts_with("std::vector")
    {
        Some("std::map")
    } else {
        None
    };
    if let Some(key) = retry {
        if let Some(body) = cfg.return_statements.get(key) {
            return Resolution::Table(body);
        }
    }
    Resolution::Miss
}

/// Assembles the body block for one signature: optional constructor
/// initializer line, braces, canned statements, trailing blank line. The
/// boolean reports an unresolved return type.
pub fn body_block(cfg: &Config, sig: &Signature) -> (String, bool) {
    let mut out = String::new();
    for (header, prologue) in cfg.ctor_prologues {
        if sig.text.trim() == *header {
            out.push_str(prologue);
            out.push('\n');
        }
    }
    out.push_str("{\n");
    let resolution = resolve(cfg, sig);
    if let Resolution::Table(body) = resolution {
        out.push_str(body);
    }
    out.push_str("\n}\n\n");
    (out, matches!(resolution, Resolution::Miss))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(return_type: &str, class_name: &str, func_name: &str) -> Signature {
        Signature {
            return_type: return_type.to_string(),
            class_name: class_name.to_string(),
            func_name: func_name.to_string(),
            ..Signature::default()
        }
    }

    #[test]
    fn status_maps_to_success() {
        let cfg = Config::builtin();
        let (body, missed) = body_block(&cfg, &sig("Status", "", "Check"));
        assert_eq!(body, "{\n    return SUCCESS;\n}\n\n");
        assert!(!missed);
    }

    #[test]
    fn graph_status_gets_the_diagnostic_body() {
        let cfg = Config::builtin();
        let (body, missed) = body_block(&cfg, &sig("ge::graphStatus", "TilingDef", "SaveToBuffer"));
        assert!(body.contains("[ERROR]: stub library libregister"));
        assert!(body.contains("return ge::GRAPH_FAILED;"));
        assert!(!missed);
    }

    #[test]
    fn most_specific_key_wins() {
        let cfg = Config::builtin();
        match resolve(&cfg, &sig("ByteBuffer&", "OpRunInfo", "GetAllTilingData")) {
            Resolution::Table(body) => assert!(body.contains("static ByteBuffer buf;")),
            other => panic!("unexpected: {other:?}"),
        }
        match resolve(&cfg, &sig("ByteBuffer&", "SomeOther", "Get")) {
            Resolution::Table(body) => assert_eq!(body, "    return buf;"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn class_layer_beats_bare_type() {
        let cfg = Config::builtin();
        match resolve(&cfg, &sig("OpParamDef&", "OpParamDef", "Anything")) {
            Resolution::Table(body) => assert_eq!(body, "    return *this;"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn constructors_and_void_are_silently_empty() {
        let cfg = Config::builtin();
        let mut ctor = sig("", "OpDef", "OpDef");
        ctor.is_ctor_like = true;
        let (body, missed) = body_block(&cfg, &ctor);
        assert_eq!(body, "{\n\n}\n\n");
        assert!(!missed);

        let (body, missed) = body_block(&cfg, &sig("void", "OpDef", "Reset"));
        assert_eq!(body, "{\n\n}\n\n");
        assert!(!missed);
    }

    #[test]
    fn pointer_shapes_fall_back_to_nullptr() {
        let cfg = Config::builtin();
        match resolve(&cfg, &sig("char*", "OpDef", "GetName")) {
            Resolution::Table(body) => assert_eq!(body, "    return nullptr;"),
            other => panic!("unexpected: {other:?}"),
        }
        match resolve(&cfg, &sig("std::unique_ptr<OpDef>", "", "Take")) {
            Resolution::Table(body) => assert_eq!(body, "    return nullptr;"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn container_shapes_fall_back_to_braces() {
        let cfg = Config::builtin();
        match resolve(&cfg, &sig("std::vector<double>", "", "Values")) {
            Resolution::Table(body) => assert_eq!(body, "    return {};"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn reference_types_never_take_shape_fallbacks() {
        let cfg = Config::builtin();
        let (body, missed) = body_block(&cfg, &sig("std::vector<OpDef>&", "", "List"));
        assert_eq!(body, "{\n\n}\n\n");
        assert!(missed);
    }

    #[test]
    fn unknown_return_type_is_a_miss() {
        let cfg = Config::builtin();
        let (body, missed) = body_block(&cfg, &sig("WeirdHandle", "OpDef", "Grab"));
        assert_eq!(body, "{\n\n}\n\n");
        assert!(missed);
    }

    #[test]
    fn registered_constructor_gets_its_initializer_line() {
        let cfg = Config::builtin();
        let mut ctor = sig("", "OpImplRegister", "OpImplRegister");
        ctor.is_ctor_like = true;
        ctor.text = "OpImplRegister::OpImplRegister(const ge::char_t *op_type)".to_string();
        let (body, _) = body_block(&cfg, &ctor);
        assert_eq!(
            body,
            "    : functions_(OpImplRegistry::GetInstance().CreateOrGetOpImpl(op_type))\n{\n\n}\n\n"
        );
    }
}
