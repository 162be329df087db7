//! Compiler argument synthesis.
//!
//! The argument order is fixed: compilers report diagnostics and derive
//! cache keys from the command line, so the same descriptor must always
//! produce the same list.

use std::path::Path;

use crate::descriptor::ProjectDescriptor;
use crate::host::Host;
use crate::path::normalize;

fn quoted(path: &Path) -> String {
    format!("\"{}\"", path.display())
}

fn switch(name: &str, on: bool) -> String {
    format!("--{name}{}", if on { '+' } else { '-' })
}

/// Build the ordered compiler arguments for `d`.
pub fn build_args(d: &ProjectDescriptor) -> Vec<String> {
    let mut args = vec![
        "--noframework".to_string(),
        format!("--out:{}", quoted(&d.output_path)),
        format!("--target:{}", d.output_kind.as_str()),
        switch("debug", d.debug_symbols),
        format!("--debug:{}", d.debug_type),
        switch("optimize", d.optimize),
        switch("tailcalls", d.tailcalls),
    ];

    args.extend(d.define_constants.iter().map(|c| format!("--define:{c}")));
    args.push(format!("--warn:{}", d.warning_level));

    if let Some(doc) = &d.doc_file {
        args.push(format!("--doc:{}", quoted(doc)));
    }

    for r in &d.references {
        let location = match &r.hint_path {
            Some(path) => quoted(path),
            None => format!("\"{}.dll\"", r.name),
        };
        args.push(format!("--reference:{location}"));
    }

    args.extend(
        d.sources
            .iter()
            .map(|s| quoted(&normalize(s, &d.project_dir))),
    );

    args
}

/// Arguments as handed to the compiler process: the display quotes around
/// path values are removed, since no shell sits between us and the
/// compiler to strip them.
pub fn exec_args(args: &[String]) -> Vec<String> {
    args.iter().map(|arg| unquote(arg)).collect()
}

/// `--out:"/a b/Foo.dll"` becomes `--out:/a b/Foo.dll`; an argument that
/// does not end in a quoted value is returned unchanged.
fn unquote(arg: &str) -> String {
    match (arg.find('"'), arg.strip_suffix('"')) {
        (Some(open), Some(body)) if open < body.len() => {
            format!("{}{}", &arg[..open], &body[open + 1..])
        }
        _ => arg.to_string(),
    }
}

/// Render the full command line: compiler followed by `args`, space-separated.
pub fn command_line(host: &Host, args: &[String]) -> String {
    let mut line = host.compiler().to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}
