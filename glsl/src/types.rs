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


//! GLSL spelling of declared uniform types.

use glsl::syntax::{ArraySpecifier, TypeSpecifier, TypeSpecifierNonArray};
use glsl::transpiler::glsl::{show_array_spec, show_type_specifier_non_array};

/// Renders the type of a declarator, `array` being the array specifier written after its name.
pub fn type_name(ty: &TypeSpecifier, array: Option<&ArraySpecifier>) -> String
{
    let mut name = String::new();
    match &ty.ty {
        //Inline struct definitions are shortened to their name
        TypeSpecifierNonArray::Struct(s) => name.push_str(s.name.as_ref().map(|v| v.0.as_str()).unwrap_or("struct")),
        other => show_type_specifier_non_array(&mut name, other)
    }
    if let Some(v) = &ty.array_specifier {
        show_array_spec(&mut name, v);
    }
    if let Some(v) = array {
        show_array_spec(&mut name, v);
    }
    name
}

#[cfg(test)]
mod tests
{
    use glsl::parser::Parse;

    use super::*;

    fn render(ty: &str, array: Option<&str>) -> String
    {
        let ty = TypeSpecifier::parse(ty).unwrap();
        let array = array.map(|v| ArraySpecifier::parse(v).unwrap());
        type_name(&ty, array.as_ref())
    }

    #[test]
    fn builtin_types()
    {
        assert_eq!(render("mat4", None), "mat4");
        assert_eq!(render("ivec3", None), "ivec3");
        assert_eq!(render("sampler2D", None), "sampler2D");
        assert_eq!(render("texture2D", None), "texture2D");
    }

    #[test]
    fn arrays_and_structs()
    {
        assert_eq!(render("float[4]", None), "float[4]");
        assert_eq!(render("vec4", Some("[2]")), "vec4[2]");
        assert_eq!(render("struct Light { vec3 color; }", None), "Light");
        assert_eq!(render("Light", Some("[8]")), "Light[8]");
    }
}
