//! Templates shipped with the engine

use super::{Template, TemplateKind, Variation};

const CARD_CODE: &str = r#"import React from 'react';
import './Card.css';

interface CardProps {
  title: string;
  content: string;
  imageSrc?: string;
  onClick?: () => void;
}

const Card: React.FC<CardProps> = ({ title, content, imageSrc, onClick }) => {
  return (
    <div className="card" onClick={onClick}>
      {imageSrc && <img src={imageSrc} className="card-image" />}
      <div className="card-body">
        <h3 className="card-title">{title}</h3>
        <p className="card-content">{content}</p>
      </div>
    </div>
  );
};

export default Card;"#;

const CARD_STYLE: &str = r#".card {
  border-radius: 8px;
  overflow: hidden;
  box-shadow: 0 4px 6px rgba(0, 0, 0, 0.1);
  transition: all 0.3s ease;
  cursor: pointer;
  background-color: white;
}

.card:hover {
  transform: translateY(-5px);
  box-shadow: 0 8px 12px rgba(0, 0, 0, 0.15);
}

.card-image {
  width: 100%;
  height: 200px;
  object-fit: cover;
}

.card-body {
  padding: 16px;
}

.card-title {
  margin: 0 0 8px;
  font-size: 1.25rem;
  font-weight: 600;
}

.card-content {
  color: #666;
  margin: 0;
  line-height: 1.5;
}"#;

const CARD_DARK_CODE: &str = r#"import React from 'react';
import './Card.css';

interface CardProps {
  title: string;
  content: string;
  imageSrc?: string;
  onClick?: () => void;
}

const Card: React.FC<CardProps> = ({ title, content, imageSrc, onClick }) => {
  return (
    <div className="card dark" onClick={onClick}>
      {imageSrc && <img src={imageSrc} className="card-image" alt={title} />}
      <div className="card-body">
        <h3 className="card-title">{title}</h3>
        <p className="card-content">{content}</p>
      </div>
    </div>
  );
};

export default Card;"#;

const CARD_DARK_STYLE: &str = r#".card {
  border-radius: 8px;
  overflow: hidden;
  box-shadow: 0 4px 6px rgba(0, 0, 0, 0.3);
  transition: all 0.3s ease;
  cursor: pointer;
}

.card.dark {
  background-color: #2a2a2a;
  color: #e0e0e0;
}

.card:hover {
  transform: translateY(-5px);
  box-shadow: 0 8px 12px rgba(0, 0, 0, 0.3);
}

.card-image {
  width: 100%;
  height: 200px;
  object-fit: cover;
}

.card-body {
  padding: 16px;
}

.card-title {
  margin: 0 0 8px;
  font-size: 1.25rem;
  font-weight: 600;
}

.card.dark .card-title {
  color: #ffffff;
}

.card-content {
  margin: 0;
  line-height: 1.5;
}

.card.dark .card-content {
  color: #b0b0b0;
}"#;

const CARD_HIGH_CONTRAST_CODE: &str = r#"import React from 'react';
import './Card.css';

interface CardProps {
  title: string;
  content: string;
  imageSrc?: string;
  onClick?: () => void;
}

const Card: React.FC<CardProps> = ({ title, content, imageSrc, onClick }) => {
  return (
    <div className="card high-contrast" onClick={onClick} tabIndex={0} role="button" aria-label={title}>
      {imageSrc && <img src={imageSrc} className="card-image" alt={title} />}
      <div className="card-body">
        <h3 className="card-title">{title}</h3>
        <p className="card-content">{content}</p>
      </div>
    </div>
  );
};

export default Card;"#;

const CARD_HIGH_CONTRAST_STYLE: &str = r#".card.high-contrast {
  border-radius: 8px;
  overflow: hidden;
  box-shadow: 0 0 0 2px #ffffff;
  transition: all 0.3s ease;
  cursor: pointer;
  background-color: #000000;
  color: #ffffff;
  border: 3px solid #ffffff;
}

.card.high-contrast:hover,
.card.high-contrast:focus {
  outline: 4px solid #ffff00;
  transform: translateY(-5px);
}

.card-image {
  width: 100%;
  height: 200px;
  object-fit: cover;
}

.card-body {
  padding: 16px;
}

.card-title {
  margin: 0 0 8px;
  font-size: 1.5rem;
  font-weight: bold;
}

.card.high-contrast .card-title {
  color: #ffff00;
}

.card-content {
  margin: 0;
  line-height: 1.5;
}

.card.high-contrast .card-content {
  color: #ffffff;
}"#;

const PAGE_CODE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Page</title>
  <link rel="stylesheet" href="page.css">
</head>
<body>
  <header class="page-header">
    <nav class="page-nav">
      <a href="/">Home</a>
      <a href="/about">About</a>
    </nav>
  </header>
  <main class="container">
    <section class="hero">
      <img src="hero.jpg" class="hero-image">
      <h1>Welcome</h1>
      <p>Start building from here.</p>
      <button class="btn" type="button">Get started</button>
    </section>
  </main>
  <footer class="page-footer">
    <p>&copy; Your Company</p>
  </footer>
  <script src="page.js"></script>
</body>
</html>"#;

const PAGE_STYLE: &str = r#"body {
  font-family: system-ui, sans-serif;
  margin: 0;
}

.page-header, .page-footer {
  padding: 1rem;
}

.page-nav a {
  margin-right: 1rem;
}

.hero-image {
  max-width: 100%;
}"#;

const PAGE_SCRIPT: &str = r#"document.querySelector('.btn')?.addEventListener('click', () => {
  document.querySelector('.hero')?.classList.add('started');
});"#;

/// Templates available in every registry
pub(crate) fn templates() -> Vec<Template> {
    vec![react_card(), html_page()]
}

fn react_card() -> Template {
    Template::new("react-card", "Card", TemplateKind::React, CARD_CODE)
        .with_description("A simple card component with title, content, and optional image")
        .with_style(CARD_STYLE)
        .with_variation(
            "dark-theme",
            Variation::new(CARD_DARK_CODE).with_style(CARD_DARK_STYLE),
        )
        .with_variation(
            "high-contrast",
            Variation::new(CARD_HIGH_CONTRAST_CODE).with_style(CARD_HIGH_CONTRAST_STYLE),
        )
}

fn html_page() -> Template {
    Template::new("html-page", "Page", TemplateKind::Html, PAGE_CODE)
        .with_description("A static page with header, navigation, hero section and footer")
        .with_style(PAGE_STYLE)
        .with_script(PAGE_SCRIPT)
}
