//! UI serving routes
//!
//! Serves the single-page checker: upload or URL intake, preview, analysis
//! trigger, findings list and reset. Page behavior mirrors
//! [`crate::presentation`]; limits and labels come from `GET /api/catalog`.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};

use crate::AppState;

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(serve_index))
        .route("/static/app.js", get(serve_app_js))
}

/// GET /
///
/// Serves the main UI page with build identification in the footer
pub async fn serve_index() -> Html<String> {
    let footer = format!(
        "plic-gw v{} [{}] built {}",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
    );
    Html(INDEX_HTML.replace("{{BUILD_FOOTER}}", &footer))
}

/// GET /static/app.js
pub async fn serve_app_js() -> Response {
    (
        StatusCode::OK,
        [
            ("content-type", "application/javascript"),
            ("cache-control", "no-cache, no-store, must-revalidate"),
        ],
        APP_JS,
    )
        .into_response()
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Pakistan Localization Image Checker</title>
    <style>
        * { box-sizing: border-box; }
        body {
            font-family: system-ui, -apple-system, 'Segoe UI', sans-serif;
            background: #f3f6f4;
            color: #1f2937;
            margin: 0;
            line-height: 1.6;
        }
        .container { max-width: 860px; margin: 40px auto; padding: 0 20px; }
        header { text-align: center; margin-bottom: 24px; }
        h1 { color: #01411c; margin-bottom: 4px; }
        .subtitle { color: #4b5563; margin-top: 0; }
        .card {
            background: white;
            border-radius: 12px;
            box-shadow: 0 4px 16px rgba(0, 0, 0, 0.08);
            padding: 24px;
        }
        .tabs { display: flex; gap: 8px; margin-bottom: 16px; }
        .tab {
            flex: 1;
            padding: 10px;
            border: 1px solid #d1d5db;
            background: #f9fafb;
            border-radius: 8px;
            cursor: pointer;
            font-size: 15px;
        }
        .tab.active { background: #01411c; color: white; border-color: #01411c; }
        .dropzone {
            border: 2px dashed #9ca3af;
            border-radius: 10px;
            padding: 40px 20px;
            text-align: center;
            cursor: pointer;
            color: #4b5563;
        }
        .dropzone.dragover { border-color: #01411c; background: #ecfdf5; }
        .url-row { display: flex; gap: 8px; }
        .url-row input {
            flex: 1;
            padding: 10px;
            border: 1px solid #d1d5db;
            border-radius: 8px;
            font-size: 15px;
        }
        button.primary, button.secondary {
            padding: 10px 20px;
            border-radius: 8px;
            border: none;
            font-size: 15px;
            cursor: pointer;
        }
        button.primary { background: #01411c; color: white; }
        button.primary:disabled { background: #9ca3af; cursor: not-allowed; }
        button.secondary { background: #e5e7eb; color: #1f2937; }
        .preview { text-align: center; margin: 16px 0; }
        .preview img { max-width: 100%; max-height: 360px; border-radius: 8px; }
        .actions { display: flex; gap: 8px; justify-content: center; margin-top: 12px; }
        .error {
            background: #fef2f2;
            border: 1px solid #fecaca;
            color: #b91c1c;
            padding: 10px 14px;
            border-radius: 8px;
            margin-top: 16px;
        }
        .summary { padding: 14px; border-radius: 8px; margin: 16px 0; }
        .summary.ok { background: #ecfdf5; border: 1px solid #a7f3d0; }
        .summary.issues { background: #fffbeb; border: 1px solid #fde68a; }
        .finding { border: 1px solid #e5e7eb; border-radius: 8px; padding: 12px 14px; margin-bottom: 10px; }
        .finding-head { display: flex; align-items: center; gap: 8px; font-weight: 600; }
        .badge { color: white; border-radius: 999px; padding: 1px 10px; font-size: 13px; }
        .suggestion { background: #f9fafb; border-left: 3px solid #01411c; padding: 6px 10px; margin-top: 6px; }
        .meta { color: #6b7280; font-size: 13px; }
        .hidden { display: none; }
        footer { text-align: center; color: #9ca3af; font-size: 12px; margin: 24px 0; }
    </style>
</head>
<body>
    <div class="container">
        <header>
            <h1>🇵🇰 Pakistan Localization Image Checker</h1>
            <p class="subtitle">Check whether an image fits Pakistani language conventions, design style, religious taboos and cultural customs</p>
        </header>

        <div class="card">
            <div class="tabs">
                <button class="tab active" id="tab-file" type="button">File upload</button>
                <button class="tab" id="tab-url" type="button">URL input</button>
            </div>

            <div id="file-panel">
                <div class="dropzone" id="dropzone">
                    <p><strong>Drag an image here</strong> or click to choose a file</p>
                    <p class="meta" id="upload-hint">PNG, JPEG, JPG or WebP, up to 10 MB</p>
                </div>
                <input type="file" id="file-input" class="hidden">
            </div>

            <div id="url-panel" class="hidden">
                <div class="url-row">
                    <input type="text" id="url-input" placeholder="https://example.com/banner.png">
                    <button class="secondary" id="load-url" type="button">Load image</button>
                </div>
            </div>

            <div class="preview hidden" id="preview">
                <img id="preview-img" alt="Selected image">
                <div class="actions">
                    <button class="primary" id="analyze" type="button">Start analysis</button>
                    <button class="secondary" id="reset" type="button">Choose again</button>
                </div>
            </div>

            <div class="error hidden" id="error"></div>

            <div id="results" class="hidden">
                <div class="summary" id="summary"></div>
                <div id="findings"></div>
                <p class="meta" id="result-meta"></p>
            </div>
        </div>

        <footer>{{BUILD_FOOTER}}</footer>
    </div>
    <script src="/static/app.js"></script>
</body>
</html>
"#;

const APP_JS: &str = r#"'use strict';

// Transient page state; reset() returns to exactly this shape
const initialState = () => ({
    selection: null,   // { source: 'file'|'url', data, name }
    preview: null,
    result: null,
    error: null,
});

let mode = 'file';
let state = initialState();
let pending = false;
let generation = 0;
let catalog = {
    issueTypes: [],
    severities: [
        { id: 'high', label: 'High', color: '#ef4444', rank: 0 },
        { id: 'medium', label: 'Medium', color: '#f59e0b', rank: 1 },
        { id: 'low', label: 'Low', color: '#10b981', rank: 2 },
    ],
    upload: { acceptedTypes: ['image/png', 'image/jpeg', 'image/jpg', 'image/webp'], maxBytes: 10 * 1024 * 1024 },
};

const $ = (id) => document.getElementById(id);

async function loadCatalog() {
    try {
        const response = await fetch('/api/catalog');
        if (response.ok) {
            catalog = await response.json();
        }
    } catch (e) {
        console.warn('Catalog unavailable, using built-in labels', e);
    }
}

function severityInfo(id) {
    return catalog.severities.find((s) => s.id === id) || { id, label: id, color: '#6b7280', rank: 99 };
}

function issueTypeInfo(id) {
    return catalog.issueTypes.find((t) => t.id === id) || { id, label: id, icon: '•' };
}

// Stable sort by explicit severity rank
function sortBySeverity(issues) {
    return issues
        .map((finding, index) => ({ finding, index }))
        .sort((a, b) => severityInfo(a.finding.severity).rank - severityInfo(b.finding.severity).rank || a.index - b.index)
        .map((entry) => entry.finding);
}

function setError(message) {
    state.error = message;
    render();
}

function select(selection) {
    state.selection = selection;
    state.preview = selection.data;
    state.result = null;
    state.error = null;
    render();
}

// Format named by the leading magic bytes, or null
function sniffImageType(bytes) {
    const starts = (sig, offset = 0) => sig.every((b, i) => bytes[offset + i] === b);
    if (starts([0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A])) return 'image/png';
    if (starts([0xFF, 0xD8, 0xFF])) return 'image/jpeg';
    if (starts([0x52, 0x49, 0x46, 0x46]) && starts([0x57, 0x45, 0x42, 0x50], 8)) return 'image/webp';
    return null;
}

async function handleFile(file) {
    state.error = null;
    if (!catalog.upload.acceptedTypes.includes(file.type)) {
        setError('Only PNG, JPEG, JPG and WebP images are supported');
        return;
    }
    if (file.size > catalog.upload.maxBytes) {
        setError('Image is larger than 10 MB');
        return;
    }
    const declared = file.type === 'image/jpg' ? 'image/jpeg' : file.type;
    const head = new Uint8Array(await file.slice(0, 12).arrayBuffer());
    if (sniffImageType(head) !== declared) {
        setError('File content does not match its type (' + file.type + ')');
        return;
    }
    const reader = new FileReader();
    reader.onload = () => select({ source: 'file', data: reader.result, name: file.name });
    reader.onerror = () => setError('Could not read the file');
    reader.readAsDataURL(file);
}

function handleUrl() {
    const value = $('url-input').value.trim();
    if (!value) {
        setError('Please enter an image URL');
        return;
    }
    try {
        new URL(value);
    } catch (e) {
        setError('Please enter a valid image URL');
        return;
    }
    select({ source: 'url', data: value, name: null });
}

async function analyze() {
    if (pending) {
        return;
    }
    state.error = null;
    state.result = null;
    if (!state.selection) {
        setError('Please upload or enter an image first');
        return;
    }

    pending = true;
    const started = generation;
    render();

    let result = null;
    let error = null;
    try {
        const body = {
            source: state.selection.source,
            encodedImageOrUrl: state.selection.data,
        };
        if (state.selection.name) {
            body.displayName = state.selection.name;
        }
        const response = await fetch('/api/analyze-image', {
            method: 'POST',
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify(body),
        });
        if (!response.ok) {
            let message = 'Analysis failed';
            try {
                const data = await response.json();
                message = data.error || message;
            } catch (e) {
                message = `Server error (${response.status})`;
            }
            throw new Error(message);
        }
        result = await response.json();
    } catch (e) {
        error = e.message || 'Something went wrong during analysis';
    } finally {
        pending = false;
    }

    // A reset while pending drops the outcome
    if (started === generation) {
        state.result = result;
        state.error = error;
    }
    render();
}

function reset() {
    generation += 1;
    state = initialState();
    $('url-input').value = '';
    $('file-input').value = '';
    render();
}

function setMode(next) {
    mode = next;
    render();
}

function renderFindings(result) {
    const container = $('findings');
    container.replaceChildren();
    for (const finding of sortBySeverity(result.issues || [])) {
        const severity = severityInfo(finding.severity);
        const type = issueTypeInfo(finding.type);

        const card = document.createElement('div');
        card.className = 'finding';

        const head = document.createElement('div');
        head.className = 'finding-head';
        const title = document.createElement('span');
        title.textContent = `${type.icon} ${type.label}`;
        const badge = document.createElement('span');
        badge.className = 'badge';
        badge.style.background = severity.color;
        badge.textContent = severity.label;
        head.append(title, badge);

        const description = document.createElement('p');
        description.textContent = finding.description;

        card.append(head, description);
        if (finding.suggestion) {
            const suggestion = document.createElement('div');
            suggestion.className = 'suggestion';
            suggestion.textContent = `Suggestion: ${finding.suggestion}`;
            card.append(suggestion);
        }
        container.append(card);
    }
}

function render() {
    $('tab-file').classList.toggle('active', mode === 'file');
    $('tab-url').classList.toggle('active', mode === 'url');
    $('file-panel').classList.toggle('hidden', mode !== 'file' || !!state.preview);
    $('url-panel').classList.toggle('hidden', mode !== 'url' || !!state.preview);

    $('preview').classList.toggle('hidden', !state.preview);
    if (state.preview) {
        $('preview-img').src = state.preview;
    } else {
        $('preview-img').removeAttribute('src');
    }

    const button = $('analyze');
    button.disabled = pending;
    button.textContent = pending ? 'Analyzing…' : 'Start analysis';

    $('error').classList.toggle('hidden', !state.error);
    $('error').textContent = state.error || '';

    const result = state.result;
    $('results').classList.toggle('hidden', !result);
    if (result) {
        const summary = $('summary');
        summary.className = 'summary ' + (result.hasIssues ? 'issues' : 'ok');
        summary.textContent = (result.hasIssues ? '⚠️ ' : '✅ ') + (result.overallSummary || '');
        renderFindings(result);
        $('result-meta').textContent = `${result.imageInfo.fileName} · ${new Date(result.timestamp).toLocaleString()}`;
    }
}

function wire() {
    $('tab-file').addEventListener('click', () => setMode('file'));
    $('tab-url').addEventListener('click', () => setMode('url'));

    const dropzone = $('dropzone');
    dropzone.addEventListener('click', () => $('file-input').click());
    dropzone.addEventListener('dragover', (e) => {
        e.preventDefault();
        dropzone.classList.add('dragover');
    });
    dropzone.addEventListener('dragleave', (e) => {
        e.preventDefault();
        dropzone.classList.remove('dragover');
    });
    dropzone.addEventListener('drop', (e) => {
        e.preventDefault();
        dropzone.classList.remove('dragover');
        if (e.dataTransfer.files.length > 0) {
            handleFile(e.dataTransfer.files[0]);
        }
    });
    $('file-input').addEventListener('change', (e) => {
        if (e.target.files.length > 0) {
            handleFile(e.target.files[0]);
        }
    });

    $('load-url').addEventListener('click', handleUrl);
    $('url-input').addEventListener('input', () => {
        state.error = null;
        render();
    });
    $('analyze').addEventListener('click', analyze);
    $('reset').addEventListener('click', reset);
}

document.addEventListener('DOMContentLoaded', async () => {
    wire();
    render();
    await loadCatalog();
    $('file-input').accept = catalog.upload.acceptedTypes.join(',');
});
"#;
