// This file is part of vash, a POSIX-style shell.
// Copyright (C) 2024 vash developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Here-document content population
//!
//! Here-document bodies cross token boundaries, so the lexer carries them out
//! of band in a map keyed by the identifier on the `<<` token. After parsing,
//! this pass walks the tree once and copies each body into the redirect that
//! references it. The pass mutates redirects in place, never restructures the
//! tree, and is idempotent.

use crate::syntax::{CommandList, Node, Redirect, TopLevel};
use std::collections::HashMap;

/// Populates here-document bodies throughout a parsed program.
pub fn populate_heredocs(program: &mut TopLevel, contents: &HashMap<String, String>) {
    if contents.is_empty() {
        return;
    }
    for item in &mut program.items {
        visit(item, contents);
    }
}

fn fill(redirects: &mut [Redirect], contents: &HashMap<String, String>) {
    for redirect in redirects {
        if let Some(key) = &redirect.heredoc_key {
            if let Some(content) = contents.get(key) {
                redirect.heredoc_content = Some(content.clone());
            }
        }
    }
}

fn visit_list(list: &mut CommandList, contents: &HashMap<String, String>) {
    for statement in &mut list.statements {
        visit(statement, contents);
    }
}

fn visit(node: &mut Node, contents: &HashMap<String, String>) {
    match node {
        Node::CommandList(list) | Node::StatementList(list) => visit_list(list, contents),
        Node::AndOrList(list) => {
            for pipeline in &mut list.pipelines {
                visit(pipeline, contents);
            }
        }
        Node::Pipeline(pipeline) => {
            for command in &mut pipeline.commands {
                visit(command, contents);
            }
        }
        Node::SimpleCommand(command) => fill(&mut command.redirects, contents),
        Node::IfConditional(conditional) => {
            visit_list(&mut conditional.condition, contents);
            visit_list(&mut conditional.then_part, contents);
            for (condition, body) in &mut conditional.elif_parts {
                visit_list(condition, contents);
                visit_list(body, contents);
            }
            if let Some(else_part) = &mut conditional.else_part {
                visit_list(else_part, contents);
            }
            fill(&mut conditional.redirects, contents);
        }
        Node::WhileLoop(w) => {
            visit_list(&mut w.condition, contents);
            visit_list(&mut w.body, contents);
        }
        Node::UntilLoop(u) => {
            visit_list(&mut u.condition, contents);
            visit_list(&mut u.body, contents);
        }
        Node::ForLoop(f) => visit_list(&mut f.body, contents),
        Node::CStyleForLoop(f) => visit_list(&mut f.body, contents),
        Node::CaseConditional(case) => {
            for item in &mut case.items {
                visit_list(&mut item.commands, contents);
            }
            fill(&mut case.redirects, contents);
        }
        Node::SelectLoop(select) => {
            visit_list(&mut select.body, contents);
            fill(&mut select.redirects, contents);
        }
        Node::FunctionDef(function) => visit_list(&mut function.body, contents),
        Node::SubshellGroup(group) => {
            visit_list(&mut group.statements, contents);
            fill(&mut group.redirects, contents);
        }
        Node::BraceGroup(group) => {
            visit_list(&mut group.statements, contents);
            fill(&mut group.redirects, contents);
        }
        Node::ArithmeticEvaluation(arith) => fill(&mut arith.redirects, contents),
        Node::EnhancedTestStatement(test) => fill(&mut test.redirects, contents),
        Node::ArrayInitialization(_)
        | Node::ArrayElementAssignment(_)
        | Node::BreakStatement(_)
        | Node::ContinueStatement(_)
        | Node::ProcessSubstitution(_) => {}
    }
}
