// Copyright (c) 2022, BlockProject 3D
//
// All rights reserved.
//
// Redistribution and use in source and binary forms, with or without modification,
// are permitted provided that the following conditions are met:
//
//     * Redistributions of source code must retain the above copyright notice,
//       this list of conditions and the following disclaimer.
//     * Redistributions in binary form must reproduce the above copyright notice,
//       this list of conditions and the following disclaimer in the documentation
//       and/or other materials provided with the distribution.
//     * Neither the name of BlockProject 3D nor the names of its contributors
//       may be used to endorse or promote products derived from this software
//       without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS
// "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT
// LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR
// A PARTICULAR PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT OWNER OR
// CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL,
// EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO,
// PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR
// PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF
// LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING
// NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE OF THIS
// SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.


use std::collections::{BTreeMap, BTreeSet};

use glsl::parser::Parse;
use glsl::syntax::{
    ArraySpecifier,
    Block,
    Declaration,
    Expr,
    ExternalDeclaration,
    FunIdentifier,
    InitDeclaratorList,
    StorageQualifier,
    TranslationUnit,
    TypeQualifier,
    TypeQualifierSpec,
    TypeSpecifier
};
use glsl::visitor::{Host, Visit, Visitor};

use crate::environment::Stage;
use crate::error::Error;
use crate::shader::Shader;
use crate::types::type_name;

pub struct ReflectionOptions
{
    all_uniforms: bool
}

impl ReflectionOptions
{
    pub fn new() -> Self
    {
        Self {
            all_uniforms: false
        }
    }

    /// Also report uniforms which no entry point reads.
    pub fn all_uniforms(mut self) -> Self
    {
        self.all_uniforms = true;
        self
    }

    pub fn is_all_uniforms(&self) -> bool
    {
        self.all_uniforms
    }
}

impl Default for ReflectionOptions
{
    fn default() -> Self
    {
        Self::new()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Uniform
{
    name: String,
    type_name: String,
    stages: Vec<Stage>
}

impl Uniform
{
    pub fn get_name(&self) -> &str
    {
        &self.name
    }

    pub fn get_type_name(&self) -> &str
    {
        &self.type_name
    }

    pub fn get_stages(&self) -> &[Stage]
    {
        &self.stages
    }
}

#[derive(Clone, Debug, Default)]
pub struct Reflection
{
    uniforms: Vec<Uniform>
}

impl Reflection
{
    pub fn get_num_uniforms(&self) -> usize
    {
        self.uniforms.len()
    }

    pub fn get_uniform(&self, index: usize) -> Option<&Uniform>
    {
        self.uniforms.get(index)
    }

    pub fn find_uniform(&self, name: &str) -> Option<&Uniform>
    {
        self.uniforms.iter().find(|v| v.name == name)
    }

    pub fn uniforms(&self) -> &[Uniform]
    {
        &self.uniforms
    }

    /// Adds the uniforms of one stage; a name already seen in another stage only records the stage.
    pub(crate) fn merge(&mut self, stage: Stage, uniforms: Vec<(String, String)>)
    {
        for (name, type_name) in uniforms {
            match self.uniforms.iter_mut().find(|v| v.name == name) {
                Some(existing) => {
                    if !existing.stages.contains(&stage) {
                        existing.stages.push(stage);
                    }
                },
                None => self.uniforms.push(Uniform {
                    name,
                    type_name,
                    stages: vec![stage]
                })
            }
        }
    }
}

/// Names read by a function body and the functions it calls.
#[derive(Default)]
struct FunctionUses
{
    names: BTreeSet<String>,
    calls: BTreeSet<String>
}

fn root_variable(expr: &Expr) -> Option<&str>
{
    match expr {
        Expr::Variable(id) => Some(id.as_str()),
        Expr::Bracket(inner, _) => root_variable(inner),
        _ => None
    }
}

impl Visitor for FunctionUses
{
    fn visit_expr(&mut self, expr: &Expr) -> Visit
    {
        match expr {
            Expr::Variable(id) => {
                self.names.insert(id.0.clone());
            },
            Expr::Dot(base, field) => {
                if let Some(root) = root_variable(base) {
                    self.names.insert(format!("{}.{}", root, field));
                }
            },
            Expr::FunCall(FunIdentifier::Identifier(id), _) => {
                self.calls.insert(id.0.clone());
            },
            _ => ()
        }
        Visit::Children
    }
}

struct Declared
{
    name: String,      //Reported name
    reference: String, //Name as it appears in expressions
    type_name: String
}

fn is_uniform(qualifier: Option<&TypeQualifier>) -> bool
{
    qualifier
        .map(|q| {
            q.qualifiers
                .0
                .iter()
                .any(|v| matches!(v, TypeQualifierSpec::Storage(StorageQualifier::Uniform)))
        })
        .unwrap_or(false)
}

/// Uniform declarations and function bodies of all compilation units of one stage.
#[derive(Default)]
struct StageUniforms
{
    declared: Vec<Declared>,
    functions: BTreeMap<String, FunctionUses>
}

impl StageUniforms
{
    fn declare(&mut self, name: String, reference: String, ty: &TypeSpecifier, array: Option<&ArraySpecifier>)
    {
        self.declared.push(Declared {
            name,
            reference,
            type_name: type_name(ty, array)
        });
    }

    fn add_variables(&mut self, list: &InitDeclaratorList)
    {
        if !is_uniform(list.head.ty.qualifier.as_ref()) {
            return;
        }
        let ty = &list.head.ty.ty;
        if let Some(name) = &list.head.name {
            self.declare(name.0.clone(), name.0.clone(), ty, list.head.array_specifier.as_ref());
        }
        for v in &list.tail {
            let name = &v.ident.ident.0;
            self.declare(name.clone(), name.clone(), ty, v.ident.array_spec.as_ref());
        }
    }

    fn add_block(&mut self, block: &Block)
    {
        if !is_uniform(Some(&block.qualifier)) {
            return;
        }
        for field in &block.fields {
            for member in &field.identifiers.0 {
                let member_name = &member.ident.0;
                //Members of anonymous blocks are in global scope
                let (name, reference) = match &block.identifier {
                    Some(instance) => (
                        format!("{}.{}", block.name, member_name),
                        format!("{}.{}", instance.ident, member_name)
                    ),
                    None => (member_name.clone(), member_name.clone())
                };
                self.declare(name, reference, &field.ty, member.array_spec.as_ref());
            }
        }
    }

    fn add_unit(&mut self, unit: &TranslationUnit)
    {
        for decl in unit {
            match decl {
                ExternalDeclaration::Declaration(Declaration::InitDeclaratorList(list)) => self.add_variables(list),
                ExternalDeclaration::Declaration(Declaration::Block(block)) => self.add_block(block),
                ExternalDeclaration::FunctionDefinition(def) => {
                    let mut uses = FunctionUses::default();
                    def.statement.visit(&mut uses);
                    //Overloads share one entry
                    let entry = self.functions.entry(def.prototype.name.0.clone()).or_default();
                    entry.names.extend(uses.names);
                    entry.calls.extend(uses.calls);
                },
                _ => ()
            }
        }
    }

    /// Every name read by a function reachable from `main`.
    fn used_names(&self) -> BTreeSet<&str>
    {
        let mut visited = BTreeSet::new();
        let mut pending = vec!["main"];
        let mut names = BTreeSet::new();
        while let Some(func) = pending.pop() {
            if !visited.insert(func) {
                continue;
            }
            if let Some(uses) = self.functions.get(func) {
                names.extend(uses.names.iter().map(|v| v.as_str()));
                pending.extend(uses.calls.iter().map(|v| v.as_str()));
            }
        }
        names
    }

    fn into_uniforms(self, all: bool) -> Vec<(String, String)>
    {
        let used: BTreeSet<String> = self.used_names().into_iter().map(String::from).collect();
        self.declared
            .into_iter()
            .filter(|v| all || used.contains(&v.reference))
            .map(|v| (v.name, v.type_name))
            .collect()
    }
}

/// Lists (name, type name) of the uniforms of all units of one stage in declaration order.
pub(crate) fn reflect_stage(units: &[&Shader], all: bool) -> Result<Vec<(String, String)>, Error>
{
    let mut stage = StageUniforms::default();
    for unit in units {
        let code = match unit.get_preprocessed_code() {
            Some(v) => v,
            None => continue
        };
        let ast = TranslationUnit::parse(&code).map_err(|e| Error::Syntax {
            name: unit.get_name().into(),
            message: e.info
        })?;
        stage.add_unit(&ast);
    }
    Ok(stage.into_uniforms(all))
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn uniforms(sources: &[&str], all: bool) -> Vec<(String, String)>
    {
        let mut stage = StageUniforms::default();
        for v in sources {
            stage.add_unit(&TranslationUnit::parse(v).unwrap());
        }
        stage.into_uniforms(all)
    }

    fn names(uniforms: &[(String, String)]) -> Vec<&str>
    {
        uniforms.iter().map(|(name, _)| name.as_str()).collect()
    }

    #[test]
    fn block_member_names()
    {
        let code = "#version 450
uniform Anon { mat4 a_mvp; };
uniform Named { mat4 n_mvp; vec4 n_unused; } inst;
void main()
{
    gl_Position = a_mvp * inst.n_mvp * vec4(1.0);
}
";
        let found = uniforms(&[code], false);
        assert_eq!(names(&found), vec!["a_mvp", "Named.n_mvp"]);
        assert_eq!(found[0].1, "mat4");
        let all = uniforms(&[code], true);
        assert_eq!(names(&all), vec!["a_mvp", "Named.n_mvp", "Named.n_unused"]);
    }

    #[test]
    fn loose_uniforms_follow_calls()
    {
        let code = "#version 110
uniform mat4 u_mvp, u_unused;
uniform vec4 u_colors[2];
vec4 tint()
{
    return u_colors[1];
}
void main()
{
    gl_FrontColor = tint();
    gl_Position = u_mvp * gl_Vertex;
}
";
        let found = uniforms(&[code], false);
        assert_eq!(names(&found), vec!["u_mvp", "u_colors"]);
        assert_eq!(found[1].1, "vec4[2]");
    }

    #[test]
    fn functions_are_shared_between_units()
    {
        let main = "#version 110
vec4 transform(vec4 p);
void main()
{
    gl_Position = transform(gl_Vertex);
}
";
        let helper = "#version 110
uniform mat4 u_mvp;
uniform float u_dead;
vec4 transform(vec4 p)
{
    return u_mvp * p;
}
float dead()
{
    return u_dead;
}
";
        assert_eq!(names(&uniforms(&[main, helper], false)), vec!["u_mvp"]);
    }

    #[test]
    fn merge_deduplicates_across_stages()
    {
        let mut reflection = Reflection::default();
        reflection.merge(Stage::Vertex, vec![
            ("Globals.time".into(), "float".into()),
            ("Globals.mvp".into(), "mat4".into())
        ]);
        reflection.merge(Stage::Fragment, vec![
            ("Globals.time".into(), "float".into()),
            ("u_texture".into(), "texture2D".into())
        ]);
        assert_eq!(reflection.get_num_uniforms(), 3);
        let names: Vec<&str> = reflection.uniforms().iter().map(|v| v.get_name()).collect();
        assert_eq!(names, vec!["Globals.time", "Globals.mvp", "u_texture"]);
        let time = reflection.find_uniform("Globals.time").unwrap();
        assert_eq!(time.get_stages(), &[Stage::Vertex, Stage::Fragment]);
        assert_eq!(time.get_type_name(), "float");
        assert_eq!(reflection.get_uniform(2).unwrap().get_stages(), &[Stage::Fragment]);
        assert!(reflection.get_uniform(3).is_none());
    }
}
