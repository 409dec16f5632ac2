//! Stub-generation configuration: the return-statement table, file selection
//! filters, and the fixed text blocks attached to generated units.
//!
//! Everything here is data, not engine logic. The engine receives a `Config`
//! so tests can swap in arbitrary tables.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

// -- Builtin tables -----------------------------------------------------------

/// Stub body per return-type key. Layered keys: `"ret Class::method"` beats
/// `"ret Class::"` beats `"ret"`. Bodies carry their own 4-space indentation.
const RETURN_STATEMENTS: &[(&str, &str)] = &[
    (
        "ge::graphStatus",
        concat!(
            "    std::cout << \"[ERROR]: stub library libregister cannot be used for execution, please check your \"\n",
            "        << \"environment variables and compilation options to make sure you use the correct library.\"\n",
            "        << std::endl;\n",
            "    return ge::GRAPH_FAILED;"
        ),
    ),
    ("Status", "    return SUCCESS;"),
    ("ge::AscendString", "    return ge::AscendString();"),
    (
        "ge::AscendString&",
        "    static ge::AscendString str;\n    return str;",
    ),
    ("OpDef", "    return OpDef(\"default\");"),
    ("OpDef&", "    return *this;"),
    ("ByteBuffer&", "    return buf;"),
    (
        "ByteBuffer& OpRunInfo::GetAllTilingData",
        "    static ByteBuffer buf;\n    return buf;",
    ),
    ("CTilingDataClassFactory&", "    return *this;"),
    (
        "CTilingDataClassFactory& CTilingDataClassFactory::GetInstance",
        "    static CTilingDataClassFactory instance;\n    return instance;",
    ),
    (
        "FrameworkRegistry&",
        "    static FrameworkRegistry instance;\n    return instance;",
    ),
    ("ItemFindStatus", "    return ItemFindStatus::ITEM_NOEXIST;"),
    ("KernelRegisterV2&", "    return *this;"),
    (
        "KernelRegistry&",
        "    std::shared_ptr<KernelRegistry> g_user_defined_registry = nullptr;\n    return *g_user_defined_registry;",
    ),
    ("OpAICoreConfig&", "    return *this;"),
    ("OpAICoreDef&", "    return *this;"),
    ("OpAICoreDef& OpDef::AICore", "    return this->impl_->op_aicore;"),
    ("OpAttrDef&", "    return *this;"),
    ("OpAttrDef& OpDef::Attr", "    return this->GetOrCreateAttr(name);"),
    ("OpAttrDef& OpDef::AddAttr", "    return this->impl_->attrs.back();"),
    (
        "OpAttrDef& OpDef::GetOrCreateAttr",
        "    OpAttrDef attr(name);\n    return this->AddAttr(attr);",
    ),
    ("OpCompileInfo&", "    return *this;"),
    ("OpImplRegister&", "    return *this;"),
    ("OpImplRegisterV2&", "    return *this;"),
    (
        "OpImplRegistry&",
        "    static OpImplRegistry instance;\n    return instance;",
    ),
    ("OpParamDef& OpParamDef::", "    return *this;"),
    (
        "OpParamDef& OpAICoreConfig::Input",
        "    return this->impl_->op_params.Input(name);",
    ),
    (
        "OpParamDef& OpAICoreConfig::Output",
        "    return this->impl_->op_params.Output(name);",
    ),
    (
        "OpParamDef& OpDef::Input",
        "    return this->impl_->op_params.Input(name);",
    ),
    (
        "OpParamDef& OpDef::Output",
        "    return this->impl_->op_params.Output(name);",
    ),
    ("OpRegistrationData&", "    return *this;"),
    ("OpRunInfo&", "    return *this;"),
    ("Option", "    return this->impl_->param_type;"),
    (
        "OpImplRegistry::PrivateAttrList&",
        "    static OpImplRegistry::PrivateAttrList emptyPrivateAttr;\n    return emptyPrivateAttr;",
    ),
    (
        "OpImplKernelRegistry::PrivateAttrList&",
        "    static OpImplKernelRegistry::PrivateAttrList emptyPrivateAttr;\n    return emptyPrivateAttr;",
    ),
    ("StructSizeInfoBase&", "    return *this;"),
    (
        "StructSizeInfoBase& StructSizeInfoBase::GetInstance",
        "    static StructSizeInfoBase instance;\n    return instance;",
    ),
    (
        "domi::FrameworkType",
        "    return domi::FrameworkType::FRAMEWORK_RESERVED;",
    ),
    ("domi::ImplyType", "    return domi::ImplyType::BUILDIN;"),
    (
        "gert::OpImplKernelRegistry::TilingKernelFunc&",
        "    return this->impl_->tiling_func;",
    ),
    ("std::vector<ge::DataType>&", "    return this->impl_->types;"),
    ("std::vector<ge::Format>&", "    return this->impl_->formats;"),
    ("AutoMappingSubgraphIOIndexFunc", "    return nullptr;"),
    (
        "optiling::OP_CHECK_FUNC& OpAICoreDef::GetCheckSupport",
        "    return this->impl_->op_chk_support;",
    ),
    (
        "optiling::OP_CHECK_FUNC& OpAICoreDef::GetOpSelectFormat",
        "    return this->impl_->op_sel_format;",
    ),
    (
        "optiling::OP_CHECK_FUNC& OpAICoreDef::GetOpSupportInfo",
        "    return this->impl_->op_get_support;",
    ),
    (
        "optiling::OP_CHECK_FUNC& OpAICoreDef::GetOpSpecInfo",
        "    return this->impl_->op_get_spec;",
    ),
    (
        "optiling::PARAM_GENERALIZE_FUNC& OpAICoreDef::GetParamGeneralize",
        "    return this->impl_->op_generlize_func;",
    ),
    (
        "gert::OpImplKernelRegistry::InferShapeKernelFunc&",
        "    return this->impl_->infer_shape;",
    ),
    (
        "gert::OpImplKernelRegistry::InferShapeRangeKernelFunc&",
        "    return this->impl_->infer_shape_range;",
    ),
    (
        "gert::OpImplKernelRegistry::InferDataTypeKernelFunc& OpDef::GetInferDataType",
        "    return this->impl_->infer_data_type;",
    ),
    (
        "OpImplKernelRegistry::OpImplFunctions& OpImplRegistry::CreateOrGetOpImpl",
        "    return types_to_impl_[op_type];",
    ),
    (
        "OpTilingFunc& OpTilingFuncInfo::GetOpTilingFunc",
        "    return this->tiling_func_;",
    ),
    (
        "OpTilingFuncV2& OpTilingFuncInfo::GetOpTilingFuncV2",
        "    return this->tiling_func_v2_;",
    ),
    (
        "OpTilingFuncV3& OpTilingFuncInfo::GetOpTilingFuncV3",
        "    return this->tiling_func_v3_;",
    ),
    (
        "OpParseFuncV3& OpTilingFuncInfo::GetOpParseFuncV3",
        "    return this->parse_func_v3_;",
    ),
    (
        "OpTilingFuncV4& OpTilingFuncInfo::GetOpTilingFuncV4",
        "    return this->tiling_func_v4_;",
    ),
    (
        "OpParseFuncV4& OpTilingFuncInfo::GetOpParseFuncV4",
        "    return this->parse_func_v4_;",
    ),
    ("ParseParamFunc", "    return nullptr;"),
    (
        "ParseParamByOpFunc OpRegistrationData::GetParseParamByOperatorFn",
        "    return nullptr;",
    ),
    (
        "FusionParseParamFunc OpRegistrationData::GetFusionParseParamFn",
        "    return nullptr;",
    ),
    (
        "FusionParseParamByOpFunc OpRegistrationData::GetFusionParseParamByOpFn",
        "    return nullptr;",
    ),
    (
        "ParseSubgraphFunc OpRegistrationData::GetParseSubgraphPostFn",
        "    return nullptr;",
    ),
    (
        "ParseOpToGraphFunc OpRegistrationData::GetParseOpToGraphFn",
        "    return nullptr;",
    ),
    (
        "OpBankKeyConvertFun& OpBankKeyFuncInfo::GetBankKeyConvertFunc",
        "    return convert_func_;",
    ),
    (
        "OpBankParseFun& OpBankKeyFuncInfo::GetBankKeyParseFunc",
        "    return parse_func_;",
    ),
    (
        "OpBankLoadFun& OpBankKeyFuncInfo::GetBankKeyLoadFunc",
        "    return load_func_;",
    ),
    ("Ptr", "    return nullptr;"),
    ("std::string", "    return \"\";"),
    ("std::string&", "    static std::string s;\n    return s;"),
    ("int", "    return 0;"),
    ("std::vector<std::string>", "    return {};"),
    ("std::vector<int64_t>", "    return {};"),
    (
        "std::vector<int64_t>&",
        "    static std::vector<int64_t> vec;\n    return vec;",
    ),
    (
        "std::vector<OpParamDef>& OpAICoreConfig::GetInputs",
        "    return this->impl_->op_params.GetInputs();",
    ),
    (
        "std::vector<OpParamDef>& OpAICoreConfig::GetOutputs",
        "    return this->impl_->op_params.GetOutputs();",
    ),
    (
        "std::vector<OpParamDef>& OpDef::GetInputs",
        "    return this->impl_->op_params.GetInputs();",
    ),
    (
        "std::vector<OpParamDef>& OpDef::GetOutputs",
        "    return this->impl_->op_params.GetOutputs();",
    ),
    (
        "std::vector<OpAttrDef>& OpDef::GetAttrs",
        "    return this->impl_->attrs;",
    ),
    (
        "std::vector<ge::AscendString>&",
        "    static std::vector<ge::AscendString> ops_list;\n    return ops_list;",
    ),
    ("std::map", "    return {};"),
    (
        "std::map<ge::AscendString, ge::AscendString>& OpAICoreConfig::GetCfgInfo",
        "    return this->impl_->cfg_info;",
    ),
    (
        "std::map<ge::AscendString, OpAICoreConfig>& OpAICoreDef::GetAICoreConfigs",
        "    return this->impl_->aicore_configs;",
    ),
    (
        "std::map<OpImplKernelRegistry::OpType, OpImplKernelRegistry::OpImplFunctions>&",
        "    static std::map<OpImplKernelRegistry::OpType, OpImplKernelRegistry::OpImplFunctions> m;\n    return m;",
    ),
    (
        "std::map<ge::AscendString, TuningTilingDefConstructor>& TuningTilingClassFactory::RegisterInfo",
        "    static std::map<ge::AscendString, TuningTilingDefConstructor> instance;\n    return instance;",
    ),
    (
        "std::unordered_map<std::string, OpTilingFunc>& OpTilingRegistryInterf::RegisteredOpInterf",
        "    static std::unordered_map<std::string, OpTilingFunc> interf;\n    return interf;",
    ),
    (
        "std::unordered_map<std::string, OpTilingFuncV2>& OpTilingRegistryInterf_V2::RegisteredOpInterf",
        "    static std::unordered_map<std::string, OpTilingFuncV2> interf;\n    return interf;",
    ),
    (
        "std::unordered_map<std::string, OpTilingFuncInfo>& OpTilingFuncRegistry::RegisteredOpFuncInfo",
        "    static std::unordered_map<std::string, OpTilingFuncInfo> op_func_map;\n    return op_func_map;",
    ),
    (
        "std::unordered_map<ge::AscendString, OpBankKeyFuncInfo>& OpBankKeyFuncRegistry::RegisteredOpFuncInfo",
        "    static std::unordered_map<ge::AscendString, OpBankKeyFuncInfo> op_func_map;\n    return op_func_map;",
    ),
    ("std::shared_ptr<TilingDef>", "    return nullptr;"),
    ("std::shared_ptr<TuningTilingDef>", "    return nullptr;"),
    ("int32_t", "    return 0;"),
    ("uint32_t", "    return 0;"),
    ("int64_t", "    return 0;"),
    ("uint64_t", "    return 0;"),
    ("size_t", "    return 0;"),
    ("float", "    return 0.0f;"),
    ("bool", "    return false;"),
];

/// Headers that get their own stub unit while the development allow-list is
/// active. Every collected header still contributes to the include prologue.
const ALLOW_LIST: &[&str] = &[
    "op_def.h",
    "op_def_factory.h",
    "op_impl_registry.h",
    "op_tiling_info.h",
    "op_tiling_registry.h",
    "register.h",
    "tilingdata_base.h",
    "tuning_bank_key_registry.h",
    "tuning_tiling_registry.h",
];

/// Path segment(s) under the input root that hold the headers to scan.
const INCLUDE_DIR_KEYWORDS: &[&str] = &["register"];

/// Symbol-visibility macros stripped from declarations and class openers.
const VISIBILITY_MACROS: &[&str] = &[
    "FMK_FUNC_HOST_VISIBILITY",
    "FMK_FUNC_DEV_VISIBILITY",
    "GE_FUNC_DEV_VISIBILITY",
    "GE_FUNC_HOST_VISIBILITY",
];

/// Include lines appended to the shared prologue after the collected headers.
const EXTRA_INCLUDE_LINES: &[&str] = &[
    "#include \"register/kernel_register_data.h\"",
    "#include \"register/opdef/op_def_impl.h\"",
    "#include \"register/op_impl_register_v2_impl.h\"",
    "#include <iostream>",
];

/// Constructors that need an initializer line ahead of the stub body, keyed
/// by their exact qualified header text.
const CTOR_PROLOGUES: &[(&str, &str)] = &[(
    "OpImplRegister::OpImplRegister(const ge::char_t *op_type)",
    "    : functions_(OpImplRegistry::GetInstance().CreateOrGetOpImpl(op_type))",
)];

/// Hand-written block appended to the root aggregator unit after generation.
const ROOT_TRAILER: &str = r#"
namespace domi {
class FMK_FUNC_HOST_VISIBILITY FMK_FUNC_DEV_VISIBILITY FrameworkRegistryImpl {
 public:
  void AddAutoMappingSubgraphIOIndexFunc(const domi::FrameworkType framework, AutoMappingSubgraphIOIndexFunc fun) {}
  AutoMappingSubgraphIOIndexFunc GetAutoMappingSubgraphIOIndexFunc(const domi::FrameworkType framework) { return nullptr; }
};
}  // namespace domi
"#;

// -- Compiled patterns --------------------------------------------------------

static RE_VISIBILITY: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives = VISIBILITY_MACROS.join("|");
    Regex::new(&format!(r"(?:{}) *", alternatives)).unwrap()
});

/// Qualification rewrites applied to finished definition headers, in order.
/// These requalify nested registry types that the headers name bare.
static TYPE_REWRITES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\b(KernelInfo)\b", "KernelRegistry::$1"),
        (r"\b(KernelFuncs)\b", "KernelRegistry::$1"),
        (r"\b(OpImplFunctions)\b", "OpImplKernelRegistry::$1"),
        (r"\b(OpType)\b", "OpImplKernelRegistry::$1"),
        (
            r"\b(PrivateAttrList &OpImplKernelRegistry::)",
            "OpImplKernelRegistry::$1",
        ),
        (
            r"\b(PrivateAttrList &OpImplRegistry::)",
            "OpImplRegistry::$1",
        ),
    ]
    .into_iter()
    .map(|(pat, rep)| (Regex::new(pat).unwrap(), rep))
    .collect()
});

// -- Config -------------------------------------------------------------------

/// Everything the engine treats as injected configuration.
pub struct Config {
    /// Return-type (optionally class/method qualified) to stub body text.
    pub return_statements: HashMap<String, String>,
    /// When set, only headers with these exact filenames get a stub unit.
    pub allow_list: Option<Vec<String>>,
    /// Subdirectories of the input root to scan for headers.
    pub include_dir_keywords: Vec<String>,
    /// Strips visibility macros plus their trailing spaces.
    pub visibility: &'static Regex,
    /// Maximum definition-header width before the qualification wraps.
    pub max_line_width: usize,
    pub output_prefix: String,
    pub output_extension: String,
    pub extra_include_lines: &'static [&'static str],
    /// Output unit that receives `trailer` after normal generation.
    pub root_output: String,
    pub trailer: &'static str,
    pub ctor_prologues: &'static [(&'static str, &'static str)],
    pub type_rewrites: &'static [(Regex, &'static str)],
}

impl Config {
    /// The configuration the shipped binary runs with.
    pub fn builtin() -> Self {
        Config {
            return_statements: RETURN_STATEMENTS
                .iter()
                .map(|&(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            allow_list: Some(ALLOW_LIST.iter().map(|s| s.to_string()).collect()),
            include_dir_keywords: INCLUDE_DIR_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            visibility: &RE_VISIBILITY,
            max_line_width: 100,
            output_prefix: "stub_".to_string(),
            output_extension: "cc".to_string(),
            extra_include_lines: EXTRA_INCLUDE_LINES,
            root_output: "stub_register.cc".to_string(),
            trailer: ROOT_TRAILER,
            ctor_prologues: CTOR_PROLOGUES,
            type_rewrites: TYPE_REWRITES.as_slice(),
        }
    }

    /// `op_def.h` → `stub_op_def.cc`
    pub fn output_name(&self, stem: &str) -> String {
        format!("{}{}.{}", self.output_prefix, stem, self.output_extension)
    }

    /// True when `filename` may receive a stub unit under the allow-list.
    pub fn allows(&self, filename: &str) -> bool {
        match &self.allow_list {
            Some(list) => list.iter().any(|entry| entry == filename),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_has_layered_keys() {
        let cfg = Config::builtin();
        assert_eq!(
            cfg.return_statements.get("Status").map(String::as_str),
            Some("    return SUCCESS;")
        );
        assert!(cfg
            .return_statements
            .contains_key("OpParamDef& OpParamDef::"));
        assert!(cfg
            .return_statements
            .contains_key("ByteBuffer& OpRunInfo::GetAllTilingData"));
    }

    #[test]
    fn allow_list_is_exact_filename_match() {
        let cfg = Config::builtin();
        assert!(cfg.allows("op_def.h"));
        assert!(!cfg.allows("my_op_def.h"));
        assert!(!cfg.allows("op_def.hpp"));
    }

    #[test]
    fn unfiltered_when_allow_list_absent() {
        let mut cfg = Config::builtin();
        cfg.allow_list = None;
        assert!(cfg.allows("anything.h"));
    }

    #[test]
    fn output_name_transform() {
        let cfg = Config::builtin();
        assert_eq!(cfg.output_name("op_def"), "stub_op_def.cc");
    }

    #[test]
    fn visibility_pattern_strips_macro_and_space() {
        let cfg = Config::builtin();
        assert_eq!(
            cfg.visibility.replace_all("class FMK_FUNC_HOST_VISIBILITY OpDef", ""),
            "class OpDef"
        );
    }

    #[test]
    fn rewrites_qualify_registry_types() {
        let cfg = Config::builtin();
        let mut line = "OpImplFunctions &OpImplRegistry::CreateOrGetOpImpl(const OpType &op_type)".to_string();
        for (re, rep) in cfg.type_rewrites {
            line = re.replace_all(&line, *rep).into_owned();
        }
        assert_eq!(
            line,
            "OpImplKernelRegistry::OpImplFunctions &OpImplRegistry::CreateOrGetOpImpl(const OpImplKernelRegistry::OpType &op_type)"
        );
    }
}
