//! Link hints
//!
//! Installed into every page once it has loaded. Outside of text inputs,
//! `f` labels every link and form control and `F` labels links only; the
//! label typed into the hidden input box selects an element and Return
//! follows it (`F` opens links in a new window). Escape, or a label
//! longer than any on the page, drops the labels again.
//!
//! The script installs its key listener once per document; evaluating it
//! again on the same page is a no-op.

/// Characters hint labels are spelled with
pub const HINT_CHARSET: &str = "sdfghjklertzuivbn";

pub const HINTS_SCRIPT: &str = r##"
(function() {
    var charset = "sdfghjklertzuivbn".split("");
    var key_follow = "f";
    var key_follow_new_window = "F";

    if (document.vesper_hints !== undefined)
        return;

    var hints = {
        state: "inactive",
        box: null,
        labels: null,
    };
    document.vesper_hints = hints;

    function label_id(n) {
        var id = "";
        do {
            id += charset[n % charset.length];
            n = Math.floor(n / charset.length);
        } while (n !== 0);
        return id;
    }

    function save_style(label) {
        if (label.saved_shadow === null)
            label.saved_shadow = window.getComputedStyle(label.elem)
                .getPropertyValue("box-shadow");
    }

    function restore_style(label) {
        if (label.saved_shadow !== null)
            label.elem.style.boxShadow = label.saved_shadow;
    }

    function create_labels() {
        hints.labels = {};

        var selector = "a[href]:not([href=''])";
        if (hints.state !== "follow_new")
            selector += ", input:not([type=hidden]):not([data-vesper-hints=box])" +
                        ", textarea, select, button";

        var elements = document.body.querySelectorAll(selector);
        for (var i = 0; i < elements.length; i++) {
            var elem = elements[i];
            var span = document.createElement("span");
            var s = span.style;
            s.border = "black 1pt solid";
            s.color = "black";
            s.fontFamily = "monospace";
            s.fontSize = "10pt";
            s.fontWeight = "normal";
            s.margin = "0px 2pt";
            s.position = "absolute";
            s.textTransform = "lowercase";
            s.visibility = "hidden";
            s.zIndex = "2147483647";

            if (elem.tagName.toLowerCase() === "a") {
                s.borderTopLeftRadius = "10pt";
                s.borderBottomLeftRadius = "10pt";
                s.padding = "0px 2pt 0px 5pt";
                elem.appendChild(span);
            } else {
                s.borderRadius = "10pt";
                s.padding = "0px 5pt";
                elem.parentNode.insertBefore(span, elem);
            }

            hints.labels[label_id(i)] = { elem: elem, span: span, saved_shadow: null };
        }
    }

    function remove_labels() {
        for (var id in hints.labels) {
            var label = hints.labels[id];
            restore_style(label);
            if (label.span.parentNode !== null)
                label.span.parentNode.removeChild(label.span);
        }
        hints.labels = null;
    }

    function highlight() {
        var typed = hints.box.value;
        var follow_new = hints.state === "follow_new";
        var unselected = follow_new ? "#DAFFAD" : "#A7FFF5";
        var selected = follow_new ? "#FF5D00" : "#33FF00";
        var longest = 0;

        for (var id in hints.labels) {
            var label = hints.labels[id];
            var background = unselected;
            longest = Math.max(longest, id.length);

            if (typed === "") {
                label.span.textContent = id;
                label.span.style.visibility = "visible";
                restore_style(label);
            } else if (id.indexOf(typed) === 0) {
                var ring = "#B00000";
                var suffix = "";
                if (id === typed) {
                    background = selected;
                    ring = "red";
                    if (label.elem.tagName.toLowerCase() === "a")
                        suffix = ": " + label.elem.href;
                }

                label.span.textContent = "";
                var head = document.createElement("b");
                head.textContent = typed;
                label.span.appendChild(head);
                label.span.appendChild(document.createTextNode(id.substring(typed.length) + suffix));
                label.span.style.visibility = "visible";

                save_style(label);
                label.elem.style.boxShadow = "0 0 5pt 2pt black, 0 0 0 2pt " + ring + " inset";
            } else {
                label.span.style.visibility = "hidden";
                restore_style(label);
            }
            label.span.style.backgroundColor = background;
        }

        if (typed.length > longest)
            set_state("inactive");
    }

    function create_box() {
        var box = document.createElement("input");
        box.type = "text";
        box.setAttribute("data-vesper-hints", "box");
        box.style.opacity = "0";
        box.style.position = "fixed";
        box.style.left = "0px";
        box.style.top = "0px";
        box.addEventListener("keydown", on_box_key);
        box.addEventListener("input", highlight);
        document.body.appendChild(box);
        return box;
    }

    function set_state(state) {
        hints.state = state;

        if (state === "inactive") {
            remove_labels();
            if (hints.box !== null) {
                hints.box.blur();
                hints.box.value = "";
                hints.box.style.visibility = "hidden";
            }
            return;
        }

        if (hints.labels === null)
            create_labels();
        if (hints.box === null)
            hints.box = create_box();

        hints.box.style.visibility = "visible";
        hints.box.focus();
        highlight();
    }

    function is_text_input(elem) {
        var tag = elem.tagName.toLowerCase();
        var type = elem.type ? elem.type.toLowerCase() : "";
        var buttons = ["button", "color", "checkbox", "file", "radio", "reset", "submit"];

        return (tag === "input" && buttons.indexOf(type) < 0) ||
               tag === "textarea" || tag === "select";
    }

    function follow() {
        var label = hints.labels !== null ? hints.labels[hints.box.value] : undefined;
        var follow_new = hints.state === "follow_new";
        set_state("inactive");

        if (label === undefined)
            return;

        var elem = label.elem;
        if (follow_new && elem.tagName.toLowerCase() === "a")
            window.open(elem.href);
        else if (is_text_input(elem))
            elem.focus();
        else
            elem.click();
    }

    function on_box_key(e) {
        if (e.key === "Escape") {
            e.preventDefault();
            e.stopPropagation();
            set_state("inactive");
        } else if (e.key === "Enter") {
            e.preventDefault();
            e.stopPropagation();
            follow();
        }
    }

    function on_window_key(e) {
        var target = e.target.nodeName.toLowerCase();
        if (target === "textarea" || target === "input" ||
            document.designMode === "on" || e.target.contentEditable === "true")
            return;

        if (hints.state !== "inactive")
            return;

        if (e.key === key_follow)
            set_state("follow");
        else if (e.key === key_follow_new_window)
            set_state("follow_new");
    }

    document.addEventListener("keyup", on_window_key);
})();
"##;
